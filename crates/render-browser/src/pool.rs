use crate::cancel::CancelSignal;
use crate::engine::RenderEngine;
use log::debug;
use rapport_render_core::{RenderError, RenderOptions};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Bounds how many engine processes run at once.
///
/// Requests beyond `max_instances` wait for a permit in arrival order. A request
/// cancelled while waiting returns [`RenderError::Cancelled`] without ever
/// reaching the engine.
#[derive(Debug, Clone)]
pub struct EnginePool {
    engine: Arc<dyn RenderEngine>,
    permits: Arc<Semaphore>,
    max_instances: usize,
}

impl EnginePool {
    pub fn new(engine: Arc<dyn RenderEngine>, max_instances: usize) -> Self {
        let max_instances = max_instances.max(1);
        Self {
            engine,
            permits: Arc::new(Semaphore::new(max_instances)),
            max_instances,
        }
    }

    pub fn max_instances(&self) -> usize {
        self.max_instances
    }

    /// Permits not currently held by a render.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn render(
        &self,
        html: &str,
        options: &RenderOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<u8>, RenderError> {
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let permit = tokio::select! {
            permit = self.permits.acquire() => permit
                .map_err(|e| RenderError::RenderEngine(format!("engine pool closed: {e}")))?,
            _ = cancel.cancelled() => {
                debug!("[ENGINE] request cancelled while queued");
                return Err(RenderError::Cancelled);
            }
        };
        debug!(
            "[ENGINE] {} acquired a slot ({} of {} free)",
            self.engine.name(),
            self.permits.available_permits(),
            self.max_instances
        );

        let result = self.engine.render_pdf(html, options, cancel).await;
        drop(permit);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SlowEngine, blank_pdf};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_max_instances() {
        let engine = Arc::new(SlowEngine::new(Duration::from_millis(30)));
        let pool = EnginePool::new(engine.clone(), 2);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                pool.render("<p/>", &RenderOptions::default(), &CancelSignal::new()).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), blank_pdf(1));
        }

        assert_eq!(engine.peak.load(Ordering::SeqCst), 2);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 8);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn cancelled_while_queued() {
        let engine = Arc::new(SlowEngine::new(Duration::from_millis(300)));
        let pool = EnginePool::new(engine.clone(), 1);

        let busy = {
            let pool = pool.clone();
            tokio::spawn(async move {
                pool.render("<p/>", &RenderOptions::default(), &CancelSignal::new()).await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let cancel = CancelSignal::new();
        let queued = {
            let pool = pool.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { pool.render("<p/>", &RenderOptions::default(), &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let err = queued.await.unwrap().unwrap_err();
        assert!(matches!(err, RenderError::Cancelled));
        assert!(busy.await.unwrap().is_ok());
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_instances_still_allows_one() {
        let pool = EnginePool::new(Arc::new(SlowEngine::new(Duration::ZERO)), 0);
        assert_eq!(pool.max_instances(), 1);
    }
}
