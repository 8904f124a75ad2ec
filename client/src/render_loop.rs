use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Drives a step function once per `requestAnimationFrame` until it returns
/// `false` or the loop is dropped.
///
/// The step receives the frame timestamp (same clock as `performance.now()`).
/// Dropping the `FrameLoop` cancels any pending frame, so storing a new loop
/// in the same slot replaces the old animation.
pub struct FrameLoop {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    raf_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl Inner {
    fn request_frame(&self) {
        let cb_ref = self.callback.borrow();
        let Some(ref cb) = *cb_ref else {
            return;
        };
        let Some(window) = self.window.as_ref() else {
            return;
        };
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(_) => self.raf_id.set(None),
        }
    }
}

impl FrameLoop {
    pub fn start(mut step: impl FnMut(f64) -> bool + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            raf_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        // Weak so the closure stored inside `inner` doesn't keep it alive.
        let weak = Rc::downgrade(&inner);
        let cb = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.raf_id.set(None);
            if step(now) {
                inner.request_frame();
            }
        });
        *inner.callback.borrow_mut() = Some(cb);
        inner.request_frame();

        Self { inner }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(raf_id) = self.inner.raf_id.replace(None)
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
        self.inner.callback.borrow_mut().take();
    }
}
