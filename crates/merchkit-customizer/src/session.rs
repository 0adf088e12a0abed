//! Customization session: one product, one artwork, per-side placements.
//!
//! The session owns the committed transform (through [`TransformHistory`]),
//! routes input to the [`ManipulationController`] and drives the
//! [`DualRenderer`]. Every change to the transform, interactive or
//! programmatic, goes through `push_transform`.

use crate::artwork::{LoadCompletion, LoadTicket};
use crate::controller::{ControllerOptions, GestureUpdate, ManipulationController, Modifiers};
use crate::dual::{DualRenderer, RenderScene};
use crate::handles::{BoundingSize, CanvasFrame, HandleGeometry, Point, Stage, DEFAULT_BASE_SIZE};
use crate::history::{TransformHistory, DEFAULT_HISTORY_LIMIT};
use crate::presets::{
    default_catalog, find_preset, match_preset, PlacementLabel, DEFAULT_TOLERANCE_PERCENT,
    DEFAULT_TOLERANCE_SCALE,
};
use crate::renderer::{Artwork, RenderOptions};
use merchkit_core::{
    normalize_degrees, ArtworkError, ArtworkReference, CustomizationRecord, PresetPosition,
    PrintArea, ProductCatalog, Side, StoreError, SubscriptionId, Transform,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tiny_skia::Color;
use tracing::{debug, info, warn};

/// Tunables of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub history_limit: usize,
    /// Edge of the square artwork is fitted into at scale 1, in pixels.
    pub base_artwork_px: f64,
    pub geometry: HandleGeometry,
    pub controller: ControllerOptions,
    pub tolerance_percent: f64,
    pub tolerance_scale: f64,
    pub render: RenderOptions,
    pub base_color: Color,
    pub export_texture_data_uri: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            base_artwork_px: DEFAULT_BASE_SIZE,
            geometry: HandleGeometry::default(),
            controller: ControllerOptions::default(),
            tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
            tolerance_scale: DEFAULT_TOLERANCE_SCALE,
            render: RenderOptions::default(),
            base_color: Color::WHITE,
            export_texture_data_uri: false,
        }
    }
}

/// Where the session's artwork currently stands.
#[derive(Debug, Clone)]
pub enum ArtworkSlot {
    Empty,
    Loading(LoadTicket),
    Ready(Artwork),
    Failed {
        reference: ArtworkReference,
        reason: String,
    },
}

impl ArtworkSlot {
    pub fn reference(&self) -> Option<&ArtworkReference> {
        match self {
            ArtworkSlot::Empty => None,
            ArtworkSlot::Loading(ticket) => Some(&ticket.reference),
            ArtworkSlot::Ready(artwork) => Some(artwork.reference()),
            ArtworkSlot::Failed { reference, .. } => Some(reference),
        }
    }

    pub fn artwork(&self) -> Option<&Artwork> {
        match self {
            ArtworkSlot::Ready(artwork) => Some(artwork),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Installed,
    Failed(ArtworkError),
    /// Superseded by a newer load, or the artwork was removed meanwhile.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TransformChanged(Transform),
    ArtworkInstalled(ArtworkReference),
    ArtworkFailed {
        reference: ArtworkReference,
        error: ArtworkError,
    },
    SideChanged(Side),
}

type SessionListener = Box<dyn Fn(&SessionEvent) + Send + Sync>;

pub struct CustomizationSession {
    catalog: ProductCatalog,
    presets: Vec<PresetPosition>,
    side: Side,
    print_area: PrintArea,
    saved: BTreeMap<Side, Transform>,
    history: TransformHistory,
    controller: ManipulationController,
    artwork: ArtworkSlot,
    epoch: u64,
    renderer: DualRenderer,
    options: SessionOptions,
    listeners: HashMap<SubscriptionId, SessionListener>,
}

impl CustomizationSession {
    /// Opens a session on the catalog's first side with a print area.
    pub fn new(catalog: ProductCatalog, options: SessionOptions) -> Result<Self, StoreError> {
        let side = if catalog.print_area(Side::Front).is_some() {
            Side::Front
        } else {
            catalog.sides().next().unwrap_or_default()
        };
        Self::on_side(catalog, side, options)
    }

    pub fn on_side(
        catalog: ProductCatalog,
        side: Side,
        options: SessionOptions,
    ) -> Result<Self, StoreError> {
        let print_area = catalog.require_print_area(side)?;
        let presets = if catalog.presets.is_empty() {
            default_catalog()
        } else {
            catalog.presets.clone()
        };
        info!(
            "customization session for {} on {} side ({} presets)",
            catalog.product,
            side,
            presets.len()
        );
        Ok(Self {
            presets,
            side,
            print_area,
            saved: BTreeMap::new(),
            history: TransformHistory::with_limit(Transform::default(), options.history_limit),
            controller: ManipulationController::new(options.controller),
            artwork: ArtworkSlot::Empty,
            epoch: 0,
            renderer: DualRenderer::new(options.render.clone(), options.base_color)
                .with_data_uri_export(options.export_texture_data_uri),
            catalog,
            options,
            listeners: HashMap::new(),
        })
    }

    /// Reopens a persisted customization. The caller loads the returned
    /// ticket and hands the completion back; the stored transform is kept.
    pub fn from_record(
        catalog: ProductCatalog,
        record: &CustomizationRecord,
        options: SessionOptions,
    ) -> Result<(Self, LoadTicket), StoreError> {
        let mut session = Self::on_side(catalog, record.side, options)?;
        session.history.reset(record.transform);
        let ticket = session.begin_artwork_load(record.artwork.clone(), true);
        Ok((session, ticket))
    }

    /// Persisted shape of the current placement; `None` without artwork.
    pub fn to_record(&self) -> Option<CustomizationRecord> {
        let reference = self.artwork.reference()?.clone();
        Some(CustomizationRecord {
            artwork: reference,
            transform: self.history.present(),
            side: self.side,
        })
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn presets(&self) -> &[PresetPosition] {
        &self.presets
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn print_area(&self) -> PrintArea {
        self.print_area
    }

    pub fn history(&self) -> &TransformHistory {
        &self.history
    }

    pub fn controller(&self) -> &ManipulationController {
        &self.controller
    }

    pub fn artwork(&self) -> &ArtworkSlot {
        &self.artwork
    }

    pub fn renderer(&self) -> &DualRenderer {
        &self.renderer
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Committed transform.
    pub fn transform(&self) -> Transform {
        self.history.present()
    }

    /// Transform on screen: the live one mid-gesture, else the committed one.
    pub fn displayed_transform(&self) -> Transform {
        self.controller
            .live()
            .unwrap_or_else(|| self.history.present())
    }

    /// Pixel conversion factors for the active side and artwork.
    pub fn stage(&self) -> Stage {
        let bounds = match self.artwork.artwork() {
            Some(artwork) => artwork.bounds(self.options.base_artwork_px),
            None => BoundingSize::new(self.options.base_artwork_px, self.options.base_artwork_px),
        };
        Stage::new(CanvasFrame::from_print_area(&self.print_area), bounds)
            .with_geometry(self.options.geometry)
    }

    // Artwork

    /// Starts loading new artwork. Without `keep_transform` the placement
    /// returns to the default.
    pub fn begin_artwork_load(
        &mut self,
        reference: ArtworkReference,
        keep_transform: bool,
    ) -> LoadTicket {
        self.controller.cancel();
        self.epoch += 1;
        let ticket = LoadTicket {
            reference,
            epoch: self.epoch,
        };
        info!("loading artwork {} (epoch {})", ticket.reference, ticket.epoch);
        self.artwork = ArtworkSlot::Loading(ticket.clone());
        if !keep_transform {
            self.reset_history(Transform::default());
        }
        ticket
    }

    /// Installs a finished load if it still matches the pending ticket.
    pub fn complete_artwork_load(&mut self, completion: LoadCompletion) -> LoadOutcome {
        let pending = matches!(&self.artwork, ArtworkSlot::Loading(t) if *t == completion.ticket);
        if !pending {
            debug!(
                "ignoring stale artwork load {} (epoch {})",
                completion.ticket.reference, completion.ticket.epoch
            );
            return LoadOutcome::Stale;
        }

        let reference = completion.ticket.reference;
        match completion.result {
            Ok(artwork) => {
                info!("artwork {} installed", reference);
                self.artwork = ArtworkSlot::Ready(artwork);
                self.emit(&SessionEvent::ArtworkInstalled(reference));
                LoadOutcome::Installed
            }
            Err(error) => {
                warn!("artwork {} unavailable: {}", reference, error);
                self.artwork = ArtworkSlot::Failed {
                    reference: reference.clone(),
                    reason: error.to_string(),
                };
                self.emit(&SessionEvent::ArtworkFailed {
                    reference,
                    error: error.clone(),
                });
                LoadOutcome::Failed(error)
            }
        }
    }

    /// Drops the artwork and its placement.
    pub fn remove_artwork(&mut self) {
        self.controller.cancel();
        self.artwork = ArtworkSlot::Empty;
        self.reset_history(Transform::default());
        info!("artwork removed");
    }

    // Programmatic controls

    pub fn center_design(&mut self) -> Transform {
        let t = self.history.present();
        self.commit(Transform {
            x: 50.0,
            y: 50.0,
            ..t
        })
    }

    pub fn reset_design(&mut self) -> Transform {
        self.commit(Transform::default())
    }

    /// Rotates by `degrees`, wrapping into [0,360).
    pub fn rotate_design(&mut self, degrees: f64) -> Transform {
        let t = self.history.present();
        self.commit(Transform {
            rotation: normalize_degrees(t.rotation + degrees),
            ..t
        })
    }

    /// Multiplies the scale by `factor`.
    pub fn scale_design(&mut self, factor: f64) -> Transform {
        let t = self.history.present();
        self.commit(Transform {
            scale: t.scale * factor,
            ..t
        })
    }

    /// Snaps to the preset with `id`; `None` if the id is unknown or the
    /// preset belongs to the other side.
    pub fn apply_preset(&mut self, id: &str) -> Option<Transform> {
        let Some(preset) = find_preset(&self.presets, id).filter(|p| p.side == self.side) else {
            warn!("no preset {} on {} side", id, self.side);
            return None;
        };
        let target = preset.transform.to_transform();
        Some(self.commit(target))
    }

    pub fn undo(&mut self) -> Option<Transform> {
        self.controller.cancel();
        let t = self.history.undo()?;
        self.emit(&SessionEvent::TransformChanged(t));
        Some(t)
    }

    pub fn redo(&mut self) -> Option<Transform> {
        self.controller.cancel();
        let t = self.history.redo()?;
        self.emit(&SessionEvent::TransformChanged(t));
        Some(t)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn commit(&mut self, transform: Transform) -> Transform {
        self.controller.cancel();
        let next = transform.clamp();
        if next == self.history.present() {
            return next;
        }
        self.history.push_transform(next);
        let committed = self.history.present();
        self.emit(&SessionEvent::TransformChanged(committed));
        committed
    }

    fn reset_history(&mut self, transform: Transform) {
        let before = self.history.present();
        self.history.reset(transform);
        let after = self.history.present();
        if before != after {
            self.emit(&SessionEvent::TransformChanged(after));
        }
    }

    // Input forwarding. Gestures need installed artwork.

    pub fn pointer_down(&mut self, pos: Point) -> GestureUpdate {
        if self.artwork.artwork().is_none() {
            return GestureUpdate::Ignored;
        }
        let stage = self.stage();
        self.controller.pointer_down(pos, &mut self.history, &stage)
    }

    pub fn pointer_move(&mut self, pos: Point) -> GestureUpdate {
        self.pointer_move_with(pos, Modifiers::NONE)
    }

    pub fn pointer_move_with(&mut self, pos: Point, modifiers: Modifiers) -> GestureUpdate {
        let stage = self.stage();
        self.controller
            .pointer_move_with(pos, modifiers, &mut self.history, &stage)
    }

    pub fn pointer_up(&mut self) -> GestureUpdate {
        let stage = self.stage();
        let update = self.controller.pointer_up(&mut self.history, &stage);
        self.after_gesture(update)
    }

    pub fn pointer_leave(&mut self) -> GestureUpdate {
        let stage = self.stage();
        let update = self.controller.pointer_leave(&mut self.history, &stage);
        self.after_gesture(update)
    }

    pub fn touch_start(&mut self, touches: &[Point]) -> GestureUpdate {
        if self.artwork.artwork().is_none() {
            return GestureUpdate::Ignored;
        }
        let stage = self.stage();
        self.controller.touch_start(touches, &mut self.history, &stage)
    }

    pub fn touch_move(&mut self, touches: &[Point]) -> GestureUpdate {
        let stage = self.stage();
        self.controller.touch_move(touches, &mut self.history, &stage)
    }

    pub fn touch_end(&mut self, remaining: &[Point]) -> GestureUpdate {
        let stage = self.stage();
        let update = self.controller.touch_end(remaining, &mut self.history, &stage);
        self.after_gesture(update)
    }

    fn after_gesture(&mut self, update: GestureUpdate) -> GestureUpdate {
        if let GestureUpdate::Committed(t) = update {
            self.emit(&SessionEvent::TransformChanged(t));
        }
        update
    }

    // Sides

    /// Saves the current placement and restores the other side's.
    pub fn switch_side(&mut self, side: Side) -> Result<(), StoreError> {
        if side == self.side {
            return Ok(());
        }
        let print_area = self.catalog.require_print_area(side)?;
        self.controller.cancel();
        self.saved.insert(self.side, self.history.present());
        let restored = self.saved.get(&side).copied().unwrap_or_default();
        self.history.reset(restored);
        self.side = side;
        self.print_area = print_area;
        info!("switched to {} side", side);
        self.emit(&SessionEvent::SideChanged(side));
        self.emit(&SessionEvent::TransformChanged(self.history.present()));
        Ok(())
    }

    /// Saved placement of `side`, or the live one for the active side.
    pub fn side_transform(&self, side: Side) -> Option<Transform> {
        if side == self.side {
            Some(self.history.present())
        } else {
            self.saved.get(&side).copied()
        }
    }

    // Presets and output

    /// Preset the committed placement matches, if any.
    pub fn matched_preset(&self) -> Option<&PresetPosition> {
        match_preset(
            &self.history.present(),
            self.side,
            &self.presets,
            self.options.tolerance_percent,
            self.options.tolerance_scale,
        )
    }

    pub fn placement_label(&self) -> PlacementLabel {
        PlacementLabel::from_match(self.matched_preset())
    }

    /// Brings the preview and the material up to date with what is on
    /// screen. Returns whether a render pass ran.
    pub fn render(&mut self) -> bool {
        let scene = RenderScene {
            artwork: self.artwork.artwork(),
            transform: self.displayed_transform(),
            print_area: self.print_area,
            surface: self.catalog.surface,
            stage: self.stage(),
        };
        self.renderer.sync(&scene)
    }

    // Listeners

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.listeners.insert(id, Box::new(listener));
        debug!("session listener {} registered", id);
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn emit(&self, event: &SessionEvent) {
        for listener in self.listeners.values() {
            listener(event);
        }
    }
}

impl fmt::Debug for CustomizationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomizationSession")
            .field("product", &self.catalog.product)
            .field("side", &self.side)
            .field("transform", &self.history.present())
            .field("artwork", &self.artwork.reference())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
