#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(u64);

#[derive(Debug, Default)]
pub struct RenderLoop {
    running: bool,
    pending: Option<FrameHandle>,
    next_handle: u64,
    frames: u64,
}

impl RenderLoop {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.schedule();
        true
    }

    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.pending = None;
        true
    }

    /// Takes the pending frame, leaving no handle behind. Must be called
    /// before [`RenderLoop::schedule`] can issue the next one.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        let handle = self.pending.take();
        if handle.is_some() {
            self.frames += 1;
        }
        handle
    }

    pub fn schedule(&mut self) -> Option<FrameHandle> {
        if !self.running || self.pending.is_some() {
            return None;
        }
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.pending = Some(handle);
        Some(handle)
    }
}
