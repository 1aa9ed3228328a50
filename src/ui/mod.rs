use std::sync::Arc;

use crossbeam_channel::Receiver;
use gpui::{
    AnyElement, App, AppContext, Context, IntoElement, ObjectFit, ParentElement, Render,
    RenderImage, SharedString, Styled, StyledImage, TitlebarOptions, Window, WindowOptions, div,
    img, px,
};
use gpui_component::{
    ActiveTheme, Root, Selectable, StyledExt,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use image::{Frame as ImageFrame, ImageBuffer, Rgba};

use crate::{
    pipeline::{
        DisplaySurface, FieldMark, IdentityTable, skeleton,
        trajectory::{field_position, render_field},
    },
    sensor::{SensorError, SensorSession},
    types::{FrameChannel, FrameEvent, JointKind},
};

mod main_view;
mod render_util;

/// What the window is currently showing. Body and trajectory both consume
/// the body channel; the other modes map one-to-one onto a source channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewMode {
    Color,
    Infrared,
    #[default]
    Depth,
    Body,
    Trajectory,
}

impl ViewMode {
    const ALL: [ViewMode; 5] = [
        ViewMode::Color,
        ViewMode::Infrared,
        ViewMode::Depth,
        ViewMode::Body,
        ViewMode::Trajectory,
    ];

    pub fn channel(self) -> FrameChannel {
        match self {
            ViewMode::Color => FrameChannel::Color,
            ViewMode::Infrared => FrameChannel::Infrared,
            ViewMode::Depth => FrameChannel::Depth,
            ViewMode::Body | ViewMode::Trajectory => FrameChannel::Body,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ViewMode::Color => "Color",
            ViewMode::Infrared => "Infrared",
            ViewMode::Depth => "Depth",
            ViewMode::Body => "Body",
            ViewMode::Trajectory => "Trajectory",
        }
    }
}

pub fn launch_ui(
    app: &mut App,
    event_rx: Receiver<FrameEvent>,
    session: Result<SensorSession, SensorError>,
    initial_view: ViewMode,
) -> gpui::Result<()> {
    let window_options = WindowOptions {
        titlebar: Some(TitlebarOptions {
            title: Some("Depth Studio".into()),
            ..Default::default()
        }),
        ..Default::default()
    };

    app.open_window(window_options, move |window, app| {
        let view = app.new(|_| AppView::new(event_rx, session, initial_view));
        app.new(|cx| Root::new(view, window, cx))
    })?;

    Ok(())
}

struct AppView {
    view_mode: ViewMode,
    session: Option<SensorSession>,
    session_error: Option<String>,
    event_rx: Receiver<FrameEvent>,
    surface: Option<DisplaySurface>,
    latest_image: Option<Arc<RenderImage>>,
    identity_table: IdentityTable,
    trail: Vec<FieldMark>,
    current_marks: Vec<FieldMark>,
    tracked_body_count: usize,
    frames_shown: u64,
}

impl AppView {
    fn new(
        event_rx: Receiver<FrameEvent>,
        session: Result<SensorSession, SensorError>,
        initial_view: ViewMode,
    ) -> Self {
        let (session, session_error) = match session {
            Ok(session) => (Some(session), None),
            Err(err) => (None, Some(err.to_string())),
        };

        let mut view = Self {
            view_mode: initial_view,
            session,
            session_error,
            event_rx,
            surface: None,
            latest_image: None,
            identity_table: IdentityTable::new(),
            trail: Vec::new(),
            current_marks: Vec::new(),
            tracked_body_count: 0,
            frames_shown: 0,
        };
        view.set_view(initial_view);
        view
    }

    /// Switches the active channel and reallocates the display surface to the
    /// new channel's geometry. The previous surface is discarded whole.
    fn set_view(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.surface = self
            .session
            .as_ref()
            .and_then(|session| session.description(mode.channel()))
            .map(|desc| DisplaySurface::for_description(&desc));
        self.tracked_body_count = 0;

        if mode == ViewMode::Trajectory {
            // Each visit starts a fresh travelled-path recording.
            self.identity_table = IdentityTable::new();
            self.trail.clear();
            self.current_marks.clear();
        }
    }

    /// Handles one frame event. Only the active channel is consumed; every
    /// other frame is dropped on the floor. The event value itself is the
    /// frame handle, released when it goes out of scope here.
    fn dispatch_event(&mut self, event: FrameEvent) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        match (self.view_mode, event) {
            (ViewMode::Color, FrameEvent::Color(frame)) => surface.write_color(&frame),
            (ViewMode::Infrared, FrameEvent::Infrared(frame)) => surface.write_infrared(&frame),
            (ViewMode::Depth, FrameEvent::Depth(frame)) => surface.write_depth(&frame),
            (ViewMode::Body, FrameEvent::Body(frame)) => {
                self.tracked_body_count = frame.bodies.iter().filter(|b| b.is_tracked).count();
                surface.fill(skeleton::BACKGROUND_COLOR);
                let (width, height) = (surface.width(), surface.height());
                let mut write = surface.lock();
                skeleton::draw_bodies(write.pixels(), width, height, &frame.bodies);
            }
            (ViewMode::Trajectory, FrameEvent::Body(frame)) => {
                let (width, height) = (surface.width(), surface.height());

                let tracked: Vec<_> = frame
                    .bodies
                    .iter()
                    .filter(|body| body.is_tracked)
                    .map(|body| (body.tracking_id, body.joint(JointKind::SpineMid).position))
                    .collect();
                self.tracked_body_count = tracked.len();

                let ids: Vec<u64> = tracked.iter().map(|(id, _)| *id).collect();
                let slots = self.identity_table.refresh(&ids);

                self.current_marks.clear();
                for ((_, position), slot) in tracked.into_iter().zip(slots) {
                    let Some(slot) = slot else {
                        // All six identity slots taken; this person is not drawn.
                        continue;
                    };
                    let (x, y) = field_position(position, width, height);
                    let mark = FieldMark { x, y, slot };
                    self.trail.push(mark);
                    self.current_marks.push(mark);
                }

                let mut write = surface.lock();
                render_field(write.pixels(), width, height, &self.trail, &self.current_marks);
            }
            // Inactive channel: the frame is dropped unconverted.
            _ => {}
        }
    }

    fn poll_events(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.dispatch_event(event);
        }

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if surface.take_dirty() {
            if let Some(image) = render_util::surface_to_image(surface) {
                self.frames_shown += 1;
                self.replace_latest_image(image, window, cx);
            }
        }
    }

    fn replace_latest_image(
        &mut self,
        new_image: Arc<RenderImage>,
        window: &mut Window,
        cx: &mut Context<'_, Self>,
    ) {
        if let Some(old_image) = self.latest_image.replace(new_image) {
            // Explicitly drop the previous GPU texture; otherwise the sprite atlas keeps
            // every frame and memory will climb rapidly while the sensor is running.
            cx.drop_image(old_image, Some(window));
        }
    }
}

impl Render for AppView {
    fn render(
        &mut self,
        window: &mut Window,
        cx: &mut Context<'_, Self>,
    ) -> impl gpui::IntoElement {
        cx.defer_in(window, |_, _, cx| {
            cx.notify();
        });

        self.poll_events(window, cx);

        if let Some(message) = self.session_error.clone() {
            return self.render_unavailable(&message, cx);
        }
        self.render_main(cx)
    }
}
