use playlist_share_engine::{AudioOutput, PlayRequest};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Audio output for the terminal: records what would play instead of
/// decoding it. The driver reads [`Self::active`] and reports the end of
/// each preview itself.
#[derive(Clone, Default)]
pub struct DryRunAudio {
    active: Arc<Mutex<Option<PlayRequest>>>,
}

impl DryRunAudio {
    pub fn active(&self) -> Option<PlayRequest> {
        self.active.lock().ok().and_then(|slot| slot.clone())
    }
}

impl AudioOutput for DryRunAudio {
    fn start(&mut self, request: &PlayRequest) -> Result<(), String> {
        info!(index = request.index, preview = %request.preview.as_str(), "preview start");
        let mut slot = self
            .active
            .lock()
            .map_err(|_| "audio state poisoned".to_string())?;
        *slot = Some(request.clone());
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut slot) = self.active.lock() {
            if let Some(prev) = slot.take() {
                info!(index = prev.index, "preview stop");
            }
        }
    }
}
