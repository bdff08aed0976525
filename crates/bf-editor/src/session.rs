//! Plugin session: turns presentation-layer requests into document edits.
//!
//! One request runs to completion before the next is accepted. Each handler
//! validates its whole request before touching the document, and every
//! failure, expected or not, ends up as a status notification in the
//! [`Response`] rather than escaping the session.

use crate::apply;
use crate::host::{BadgeSpec, FrameSpec, Host, TextSpec};
use crate::messages::{
    BadgeOptions, FrameOptions, Notification, PluginMessage, UiMessage, UpdateNumber,
};
use crate::selection;
use bf_core::meta;
use bf_core::model::{Color, item_name, label_text};
use bf_core::{
    BfError, Item, ItemKind, PluginConfig, Renumber, Result, SizeClass, derive_sequence_id,
    next_number, plan_renumber,
};
use serde::Serialize;
use smallvec::SmallVec;

const FRAME_CORNER_RADIUS: f32 = 10.0;
const FRAME_ITEM_SPACING: f32 = 8.0;
/// `#383838`, used when the configured colors do not parse.
const FALLBACK_DARK: Color = Color::rgb(56.0 / 255.0, 56.0 / 255.0, 56.0 / 255.0);

/// Everything a request produced for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub messages: SmallVec<[PluginMessage; 1]>,
    pub notifications: SmallVec<[Notification; 1]>,
    /// Set once the session has been cancelled; the host should close the
    /// plugin.
    pub close: bool,
}

/// A running plugin over a host document.
pub struct PluginSession<H: Host> {
    host: H,
    config: PluginConfig,
    closed: bool,
}

impl<H: Host> PluginSession<H> {
    pub fn new(host: H, config: PluginConfig) -> Self {
        Self {
            host,
            config,
            closed: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct access to the document, for edits made outside the plugin
    /// (user deleting or selecting nodes on the canvas).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Handle one raw JSON request.
    pub fn handle_json(&mut self, json: &str) -> Response {
        match UiMessage::from_json(json) {
            Ok(msg) => self.handle(msg),
            Err(err) => {
                let mut out = Response::default();
                self.report("message", err, &mut out);
                out
            }
        }
    }

    /// Handle one typed request.
    pub fn handle(&mut self, msg: UiMessage) -> Response {
        let mut out = Response::default();
        if self.closed {
            log::warn!("ignoring {} after cancel", msg.label());
            out.close = true;
            return out;
        }

        let label = msg.label();
        let result = match msg {
            UiMessage::CreateBadge { options } => match options.badge {
                Some(badge) => self.create_badge(&badge, &mut out),
                None => Err(BfError::InvalidInput("missing badge options".into())),
            },
            UiMessage::CreateDescriptionFrame { options } => match options.description_frame {
                Some(frame) => self.create_description_frame(&frame, &mut out),
                None => Err(BfError::InvalidInput(
                    "missing description frame options".into(),
                )),
            },
            UiMessage::UpdateBadgeNumber(req) => {
                self.update_number(ItemKind::Badge, &req, &mut out)
            }
            UiMessage::UpdateDescriptionFrameNumber(req) => {
                self.update_number(ItemKind::DescriptionFrame, &req, &mut out)
            }
            UiMessage::Cancel => {
                log::info!("session cancelled");
                self.closed = true;
                out.close = true;
                Ok(())
            }
        };

        if let Err(err) = result {
            self.report(label, err, &mut out);
        }
        out
    }

    /// The host selection changed: tell the panel what is selected now.
    pub fn selection_changed(&mut self) -> Response {
        let mut out = Response::default();
        if !self.closed {
            out.messages.push(selection::describe_selection(&self.host));
        }
        out
    }

    // ─── Handlers ────────────────────────────────────────────────────────

    fn create_badge(&mut self, options: &BadgeOptions, out: &mut Response) -> Result<()> {
        let size: SizeClass = options.size.parse()?;
        let color = Color::parse(&options.color)?;
        let kind = ItemKind::Badge;

        let sequence = derive_sequence_id(
            &self.host,
            &self.host.selection(),
            kind,
            self.config.sequence_prefix(kind),
        );
        let number = next_number(&self.host, kind, &sequence);

        self.host
            .load_font(&self.config.badge_font)
            .map_err(BfError::Host)?;
        let badge = self
            .host
            .create_badge(&BadgeSpec {
                name: format!("Badge Only ({number})"),
                label: label_text(number),
                size,
                color,
                font: self.config.badge_font.clone(),
            })
            .ok_or_else(|| BfError::MaterializationFailure("badge node".into()))?;

        let item = Item {
            node: badge.group,
            kind,
            number,
            sequence_id: sequence,
            size: None,
            label: Some(badge.label),
        };
        self.finish_creation(&item, out);
        Ok(())
    }

    fn create_description_frame(
        &mut self,
        options: &FrameOptions,
        out: &mut Response,
    ) -> Result<()> {
        let size: SizeClass = options.size.parse()?;
        let style = size.frame_style();
        let kind = ItemKind::DescriptionFrame;

        self.host
            .load_font(&self.config.badge_font)
            .map_err(BfError::Host)?;
        self.host
            .load_font(&self.config.description_font)
            .map_err(BfError::Host)?;

        let sequence = derive_sequence_id(
            &self.host,
            &self.host.selection(),
            kind,
            self.config.sequence_prefix(kind),
        );
        let number = next_number(&self.host, kind, &sequence);

        let frame = self
            .host
            .create_frame(&FrameSpec {
                name: item_name(kind, &sequence, number, Some(size)),
                width: style.width,
                padding: style.padding,
                item_spacing: FRAME_ITEM_SPACING,
                corner_radius: FRAME_CORNER_RADIUS,
                fill: Color::WHITE,
            })
            .ok_or_else(|| BfError::MaterializationFailure("description frame".into()))?;

        let badge_color = Color::from_hex(&self.config.frame_badge_color).unwrap_or(FALLBACK_DARK);
        let Some(badge) = self.host.create_badge(&BadgeSpec {
            name: format!("Badge Only ({number})"),
            label: label_text(number),
            size: style.badge_size,
            color: badge_color,
            font: self.config.badge_font.clone(),
        }) else {
            self.host.remove(frame);
            return Err(BfError::MaterializationFailure(
                "badge inside description frame".into(),
            ));
        };

        let text = TextSpec {
            name: "Description Text".into(),
            content: self.config.description_placeholder.clone(),
            font: self.config.description_font.clone(),
            font_size: style.font_size,
            line_height: style.line_height,
            color: Color::from_hex(&self.config.description_text_color).unwrap_or(FALLBACK_DARK),
        };
        let built = self.host.attach_badge(frame, &badge, style.line_height).is_some()
            && self.host.create_text(frame, &text).is_some();
        if !built {
            // The badge may still sit on the page if it was never attached
            self.host.remove(frame);
            self.host.remove(badge.group);
            return Err(BfError::MaterializationFailure(
                "description frame content".into(),
            ));
        }

        let item = Item {
            node: frame,
            kind,
            number,
            sequence_id: sequence,
            size: Some(size),
            label: Some(badge.label),
        };
        self.finish_creation(&item, out);
        Ok(())
    }

    /// Tag, name, place, and select a freshly built item.
    fn finish_creation(&mut self, item: &Item, out: &mut Response) {
        meta::write_item(&mut self.host, item);
        self.host.set_name(item.node, &item.name_for(item.number));
        self.host.center_on_viewport(item.node);
        self.host.set_selection(&[item.node]);

        log::info!(
            "created {} {} as #{} in {}",
            item.kind,
            item.node,
            item.number,
            item.sequence_id
        );
        let what = match item.kind {
            ItemKind::Badge => "Badge",
            ItemKind::DescriptionFrame => "Description frame",
        };
        out.notifications.push(Notification::info(
            format!(
                "{what} {} created (sequence {})",
                item.number,
                item.sequence_id.display_tag()
            ),
            self.config.timeouts.created,
        ));
        out.messages
            .push(selection::describe_node(&self.host, item.node));
    }

    fn update_number(
        &mut self,
        kind: ItemKind,
        req: &UpdateNumber,
        out: &mut Response,
    ) -> Result<()> {
        let requested = req.new_number.to_requested()?;
        let outcome = plan_renumber(&self.host, kind, &req.sequence_id, req.badge_id, requested)?;
        let target = outcome.target().node;

        match outcome {
            Renumber::Unchanged { .. } => {
                out.notifications.push(Notification::info(
                    "Number unchanged (same as the current number)",
                    self.config.timeouts.unchanged,
                ));
            }
            Renumber::Moved(plan) => {
                apply::apply_plan(&mut self.host, &plan, &self.config)?;
                self.host.set_selection(&[target]);
                let what = match kind {
                    ItemKind::Badge => "Badge",
                    ItemKind::DescriptionFrame => "Description frame",
                };
                out.notifications.push(Notification::info(
                    format!("{what} number updated and sequence reordered"),
                    self.config.timeouts.renumbered,
                ));
            }
        }
        out.messages
            .push(selection::describe_node(&self.host, target));
        Ok(())
    }

    // ─── Error reporting ─────────────────────────────────────────────────

    /// Turn a failed request into a status notification.
    fn report(&self, label: &str, err: BfError, out: &mut Response) {
        let timeout = err.status_timeout_ms(&self.config.timeouts);
        if err.is_unexpected() {
            log::error!("{label} failed: {err}");
        } else {
            log::warn!("{label} rejected ({}): {err}", err.code());
        }
        out.notifications
            .push(Notification::error(format!("Error: {err}"), timeout));
    }
}
