//! Change-driven re-rendering.

use crate::renderer::{RenderContext, RenderResult, Renderer, check_viewport};
use kurbo::Size;
use tabletop_core::Subscription;

/// Rebuilds a renderer's frame only when the model reported a change or the
/// viewport was resized.
#[derive(Debug)]
pub struct RenderScheduler {
    subscription: Subscription,
    viewport: Option<Size>,
    frames: u64,
}

impl RenderScheduler {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            viewport: None,
            frames: 0,
        }
    }

    /// Number of frames built so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Force the next call to render.
    pub fn invalidate(&mut self) {
        self.viewport = None;
    }

    /// Whether a frame for `viewport` is due. Consumes the pending change.
    pub fn needs_render(&mut self, viewport: Size) -> bool {
        let changed = self.subscription.take_changed();
        let resized = self.viewport != Some(viewport);
        self.viewport = Some(viewport);
        changed || resized
    }

    /// Build a frame if one is due. Returns whether a frame was built.
    pub fn render_if_needed<R: Renderer>(&mut self, renderer: &mut R, ctx: &RenderContext) -> RenderResult<bool> {
        check_viewport(ctx.viewport_size)?;
        if !self.needs_render(ctx.viewport_size) {
            return Ok(false);
        }
        renderer.build_frame(ctx);
        self.frames += 1;
        log::trace!("built frame {} at {:?}", self.frames, ctx.viewport_size);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_renderer::FrameRenderer;
    use tabletop_core::{Camera, InteractionController};

    #[test]
    fn test_renders_on_change_and_resize_only() {
        let mut controller = InteractionController::default();
        let mut scheduler = RenderScheduler::new(controller.subscribe());
        let mut renderer = FrameRenderer::new();
        let camera = Camera::new();
        let size = Size::new(800.0, 600.0);

        let ctx = RenderContext::new(None, &camera, size);
        assert!(scheduler.render_if_needed(&mut renderer, &ctx).unwrap());
        assert!(!scheduler.render_if_needed(&mut renderer, &ctx).unwrap());

        controller.toggle_fog();
        assert!(scheduler.render_if_needed(&mut renderer, &ctx).unwrap());
        assert!(!scheduler.render_if_needed(&mut renderer, &ctx).unwrap());

        let resized = RenderContext::new(None, &camera, Size::new(1024.0, 600.0));
        assert!(scheduler.render_if_needed(&mut renderer, &resized).unwrap());
        assert_eq!(scheduler.frames(), 3);
        assert_eq!(renderer.frame().size(), Size::new(1024.0, 600.0));
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let controller = InteractionController::default();
        let mut scheduler = RenderScheduler::new(controller.subscribe());
        let mut renderer = FrameRenderer::new();
        let camera = Camera::new();
        let ctx = RenderContext::new(None, &camera, Size::new(f64::NAN, 10.0));
        assert!(scheduler.render_if_needed(&mut renderer, &ctx).is_err());
        assert_eq!(scheduler.frames(), 0);
    }
}
