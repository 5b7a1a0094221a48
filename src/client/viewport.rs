use tokio::sync::watch;

/// Widths below this are treated as mobile.
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Source of viewport width changes.
pub struct Viewport {
    width: watch::Sender<u32>,
}

impl Viewport {
    pub fn new(width: u32) -> Self {
        let (width, _) = watch::channel(width);
        Self { width }
    }

    pub fn resize(&self, width: u32) {
        self.width.send_replace(width);
    }

    pub fn width(&self) -> u32 {
        *self.width.borrow()
    }

    /// Number of attached breakpoint watches.
    pub fn listener_count(&self) -> usize {
        self.width.receiver_count()
    }

    pub fn watch(&self, breakpoint: u32) -> BreakpointWatch {
        let width = self.width.subscribe();
        let below = *width.borrow() < breakpoint;
        BreakpointWatch {
            width,
            breakpoint,
            below,
        }
    }
}

/// `width < breakpoint`, kept current while attached. Dropping the watch
/// detaches its listener.
pub struct BreakpointWatch {
    width: watch::Receiver<u32>,
    breakpoint: u32,
    /// Result last reported by `changed`.
    below: bool,
}

impl BreakpointWatch {
    pub fn is_below(&self) -> bool {
        *self.width.borrow() < self.breakpoint
    }

    /// Wait for the next resize that flips the result. `None` once the
    /// viewport is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        loop {
            self.width.changed().await.ok()?;
            let now = *self.width.borrow_and_update() < self.breakpoint;
            if now != self.below {
                self.below = now;
                return Some(now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recomputes_on_resize() {
        let viewport = Viewport::new(1280);
        let watch = viewport.watch(MOBILE_BREAKPOINT);
        assert!(!watch.is_below());
        viewport.resize(375);
        assert!(watch.is_below());
        viewport.resize(768);
        assert!(!watch.is_below());
    }

    #[test]
    fn listener_detaches_on_drop() {
        let viewport = Viewport::new(1024);
        let first = viewport.watch(MOBILE_BREAKPOINT);
        let second = viewport.watch(1200);
        assert_eq!(viewport.listener_count(), 2);
        drop(first);
        assert_eq!(viewport.listener_count(), 1);
        assert!(second.is_below());
        drop(second);
        assert_eq!(viewport.listener_count(), 0);
    }

    #[tokio::test]
    async fn changed_skips_resizes_that_do_not_cross() {
        let viewport = Viewport::new(1024);
        let mut watch = viewport.watch(MOBILE_BREAKPOINT);
        viewport.resize(900);
        viewport.resize(500);
        assert_eq!(watch.changed().await, Some(true));
        drop(viewport);
        assert_eq!(watch.changed().await, None);
    }
}
