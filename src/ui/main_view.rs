use super::{
    ActiveTheme, AnyElement, AppView, Button, ButtonVariants, Context, FrameChannel, IntoElement,
    ObjectFit, ParentElement, Selectable, SharedString, Styled, StyledExt, StyledImage, ViewMode,
    div, h_flex,
    img, px, v_flex,
};

impl AppView {
    pub(super) fn render_main(&mut self, cx: &mut Context<'_, Self>) -> AnyElement {
        let device_name = self
            .session
            .as_ref()
            .map(|s| s.device_name().to_string())
            .unwrap_or_else(|| "no device".to_string());

        let mut button_row = h_flex().gap_2().p_3().flex_wrap();
        for mode in ViewMode::ALL {
            let selected = mode == self.view_mode;
            let mut button = Button::new(SharedString::from(mode.label()))
                .label(mode.label())
                .selected(selected);
            button = if selected {
                button.primary()
            } else {
                button.outline()
            };
            button_row = button_row.child(button.on_click(cx.listener(move |this, _, _, cx| {
                if this.view_mode != mode {
                    this.set_view(mode);
                    cx.notify();
                }
            })));
        }

        let frame_view: AnyElement = if let Some(image) = &self.latest_image {
            img(image.clone())
                .size_full()
                .object_fit(ObjectFit::Contain)
                .into_any_element()
        } else if self.surface.is_none() {
            div()
                .size_full()
                .flex()
                .items_center()
                .justify_center()
                .text_sm()
                .text_color(gpui::rgb(0x8b95a5))
                .child(format!(
                    "{} channel is not provided by {device_name}",
                    self.view_mode.label()
                ))
                .into_any_element()
        } else {
            div()
                .size_full()
                .flex()
                .items_center()
                .justify_center()
                .text_sm()
                .text_color(gpui::rgb(0x8b95a5))
                .child("Waiting for frames...")
                .into_any_element()
        };

        let status_text = match &self.surface {
            Some(surface) => {
                let mut status = format!(
                    "{device_name} · {} {}x{} · {} frames",
                    self.view_mode.label(),
                    surface.width(),
                    surface.height(),
                    self.frames_shown,
                );
                if self.view_mode.channel() == FrameChannel::Body {
                    status.push_str(&format!(" · {} tracked", self.tracked_body_count));
                }
                status
            }
            None => format!("{device_name} · {} unavailable", self.view_mode.label()),
        };

        let theme = cx.theme();
        v_flex()
            .size_full()
            .bg(gpui::rgb(0x1a2332))
            .child(button_row)
            .child(
                div()
                    .flex_1()
                    .mx_4()
                    .overflow_hidden()
                    .rounded_lg()
                    .bg(gpui::rgb(0x000000))
                    .child(frame_view),
            )
            .child(
                h_flex()
                    .p_3()
                    .items_center()
                    .child(
                        div()
                            .text_xs()
                            .text_color(theme.muted_foreground)
                            .overflow_hidden()
                            .text_ellipsis()
                            .whitespace_nowrap()
                            .child(status_text),
                    ),
            )
            .into_any_element()
    }

    pub(super) fn render_unavailable(
        &self,
        message: &str,
        cx: &mut Context<'_, Self>,
    ) -> AnyElement {
        let theme = cx.theme();
        div()
            .size_full()
            .flex()
            .items_center()
            .justify_center()
            .bg(gpui::rgb(0x1a2332))
            .child(
                v_flex()
                    .w(px(450.0))
                    .gap_2()
                    .p_4()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.group_box)
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.accent)
                            .font_semibold()
                            .child("No sensor available"),
                    )
                    .child(
                        div()
                            .text_xs()
                            .text_color(theme.muted_foreground)
                            .child("Connect a device and restart, or run with --backend synthetic."),
                    )
                    .child(div().text_color(theme.foreground).child(message.to_string())),
            )
            .into_any_element()
    }
}
