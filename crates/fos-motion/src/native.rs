//! Motion event record
//!
//! `MotionEventN` owns the samples of one event: fixed pointer properties,
//! one `PointerCoords` per pointer per sample, and one timestamp per
//! sample. Coordinates are stored in raw device space. Queries map them
//! through one of two transforms: `transform` for logical (window) space and
//! `raw_transform` for display space.

use std::fmt;

use fos_geometry::{transform_angle, BitSet32, RowMajor3x3, Transform, Vec2};

use crate::action::*;
use crate::axis::*;
use crate::pointer::{PointerCoords, PointerProperties};
use crate::source::{should_disregard_transformation, Classification, Source, ToolType};
use crate::MotionError;

/// History position selecting the current sample
pub const HISTORY_CURRENT: usize = usize::MAX;

/// Maximum number of pointers in one event
pub const MAX_POINTERS: usize = 16;

/// Highest pointer id representable in a [`BitSet32`]
pub const MAX_POINTER_ID: i32 = 31;

/// Cursor coordinate of an event without a cursor
pub const INVALID_CURSOR_POSITION: f32 = f32::NAN;

const TRANSFORMED_PRECISION: f32 = 1024.0;

/// Round to the nearest 1/1024 to drop noise from repeated scaling
#[inline]
fn round_transformed_coords(v: f32) -> f32 {
    (v * TRANSFORMED_PRECISION).round() / TRANSFORMED_PRECISION
}

fn transformed_xy(source: Source, transform: &Transform, coords: &PointerCoords) -> Vec2 {
    let xy = if should_disregard_transformation(source) {
        transform.transform_vector(coords.x, coords.y)
    } else {
        transform.transform_xy(coords.x, coords.y)
    };
    Vec2::new(round_transformed_coords(xy.x), round_transformed_coords(xy.y))
}

/// Value of `axis` for a raw sample as seen through `transform`.
///
/// X and Y move together and are rounded; relative motion takes only the
/// linear part; orientation is re-angled. Every other axis is not spatial
/// and passes through.
pub fn calculate_transformed_axis_value(
    axis: i32,
    source: Source,
    transform: &Transform,
    coords: &PointerCoords,
) -> Result<f32, MotionError> {
    match axis {
        AXIS_X => Ok(transformed_xy(source, transform, coords).x),
        AXIS_Y => Ok(transformed_xy(source, transform, coords).y),
        AXIS_RELATIVE_X => Ok(transform.transform_vector(coords.relative_x, coords.relative_y).x),
        AXIS_RELATIVE_Y => Ok(transform.transform_vector(coords.relative_x, coords.relative_y).y),
        AXIS_ORIENTATION => Ok(transform_angle(transform, coords.orientation)),
        _ => coords.axis_value(axis),
    }
}

/// Whole raw sample as seen through `transform`
pub fn calculate_transformed_coords(
    source: Source,
    transform: &Transform,
    coords: &PointerCoords,
) -> PointerCoords {
    let mut out = coords.clone();
    out.set_xy(transformed_xy(source, transform, coords));
    let relative = transform.transform_vector(coords.relative_x, coords.relative_y);
    out.relative_x = relative.x;
    out.relative_y = relative.y;
    out.orientation = transform_angle(transform, coords.orientation);
    out
}

/// Whether `source` and `action` describe a touch (not hover or scroll)
pub fn is_touch_event(source: Source, action: i32) -> bool {
    source.is_from_source(Source::CLASS_POINTER)
        && matches!(
            action_masked(action),
            ACTION_DOWN
                | ACTION_MOVE
                | ACTION_UP
                | ACTION_POINTER_DOWN
                | ACTION_POINTER_UP
                | ACTION_CANCEL
                | ACTION_OUTSIDE
        )
}

/// Event-level fields passed to [`MotionEventN::initialize`]
#[derive(Debug, Clone)]
pub struct MotionEventParams {
    pub id: i32,
    pub device_id: i32,
    pub source: Source,
    pub display_id: i32,
    pub action: i32,
    pub action_button: Buttons,
    pub flags: MotionFlags,
    pub edge_flags: EdgeFlags,
    pub meta_state: i32,
    pub button_state: Buttons,
    pub classification: Classification,
    pub transform: Transform,
    pub x_precision: f32,
    pub y_precision: f32,
    pub raw_x_cursor_position: f32,
    pub raw_y_cursor_position: f32,
    pub raw_transform: Transform,
    pub down_time_nanos: i64,
    pub event_time_nanos: i64,
}

impl Default for MotionEventParams {
    fn default() -> Self {
        Self {
            id: 0,
            device_id: 0,
            source: Source::UNKNOWN,
            display_id: 0,
            action: ACTION_DOWN,
            action_button: Buttons::empty(),
            flags: MotionFlags::empty(),
            edge_flags: EdgeFlags::empty(),
            meta_state: 0,
            button_state: Buttons::empty(),
            classification: Classification::None,
            transform: Transform::identity(),
            x_precision: 1.0,
            y_precision: 1.0,
            raw_x_cursor_position: INVALID_CURSOR_POSITION,
            raw_y_cursor_position: INVALID_CURSOR_POSITION,
            raw_transform: Transform::identity(),
            down_time_nanos: 0,
            event_time_nanos: 0,
        }
    }
}

/// Motion event record.
///
/// Pointer properties are fixed for the lifetime of the event. Samples are
/// stored flattened: `sample_pointer_coords.len() ==
/// sample_event_times.len() * pointer_count()`.
///
/// The fast accessors taking a pointer index or history position panic when
/// the index is out of range; the wrapper offers checked variants.
#[derive(Debug, Clone)]
pub struct MotionEventN {
    id: i32,
    device_id: i32,
    source: Source,
    display_id: i32,
    action: i32,
    action_button: Buttons,
    flags: MotionFlags,
    edge_flags: EdgeFlags,
    meta_state: i32,
    button_state: Buttons,
    classification: Classification,
    transform: Transform,
    raw_transform: Transform,
    x_precision: f32,
    y_precision: f32,
    raw_x_cursor_position: f32,
    raw_y_cursor_position: f32,
    down_time_nanos: i64,
    pointer_properties: Vec<PointerProperties>,
    sample_event_times: Vec<i64>,
    sample_pointer_coords: Vec<PointerCoords>,
}

impl Default for MotionEventN {
    fn default() -> Self {
        Self {
            id: 0,
            device_id: 0,
            source: Source::UNKNOWN,
            display_id: 0,
            action: 0,
            action_button: Buttons::empty(),
            flags: MotionFlags::empty(),
            edge_flags: EdgeFlags::empty(),
            meta_state: 0,
            button_state: Buttons::empty(),
            classification: Classification::None,
            transform: Transform::identity(),
            raw_transform: Transform::identity(),
            x_precision: 1.0,
            y_precision: 1.0,
            raw_x_cursor_position: INVALID_CURSOR_POSITION,
            raw_y_cursor_position: INVALID_CURSOR_POSITION,
            down_time_nanos: 0,
            pointer_properties: Vec::new(),
            sample_event_times: Vec::new(),
            sample_pointer_coords: Vec::new(),
        }
    }
}

impl MotionEventN {
    /// Validate and load a fresh event with a single sample
    pub fn initialize(
        &mut self,
        params: MotionEventParams,
        properties: &[PointerProperties],
        coords: &[PointerCoords],
    ) -> Result<(), MotionError> {
        validate_pointers(properties, coords)?;
        self.initialize_unchecked(params, properties, coords);
        Ok(())
    }

    /// Load without validation; callers guarantee matching, non-empty slices
    pub(crate) fn initialize_unchecked(
        &mut self,
        params: MotionEventParams,
        properties: &[PointerProperties],
        coords: &[PointerCoords],
    ) {
        let event_time_nanos = params.event_time_nanos;
        self.set_params(params);
        self.pointer_properties.clear();
        self.pointer_properties.extend_from_slice(properties);
        self.sample_event_times.clear();
        self.sample_pointer_coords.clear();
        self.push_sample(event_time_nanos, coords);
    }

    fn set_params(&mut self, params: MotionEventParams) {
        self.id = params.id;
        self.device_id = params.device_id;
        self.source = params.source;
        self.display_id = params.display_id;
        self.action = params.action;
        self.action_button = params.action_button;
        self.flags = params.flags;
        self.edge_flags = params.edge_flags;
        self.meta_state = params.meta_state;
        self.button_state = params.button_state;
        self.classification = params.classification;
        self.transform = params.transform;
        self.raw_transform = params.raw_transform;
        self.x_precision = params.x_precision;
        self.y_precision = params.y_precision;
        self.raw_x_cursor_position = params.raw_x_cursor_position;
        self.raw_y_cursor_position = params.raw_y_cursor_position;
        self.down_time_nanos = params.down_time_nanos;
    }

    /// Event-level fields of this event, suitable for initializing another
    pub fn params(&self) -> MotionEventParams {
        MotionEventParams {
            id: self.id,
            device_id: self.device_id,
            source: self.source,
            display_id: self.display_id,
            action: self.action,
            action_button: self.action_button,
            flags: self.flags,
            edge_flags: self.edge_flags,
            meta_state: self.meta_state,
            button_state: self.button_state,
            classification: self.classification,
            transform: self.transform.clone(),
            x_precision: self.x_precision,
            y_precision: self.y_precision,
            raw_x_cursor_position: self.raw_x_cursor_position,
            raw_y_cursor_position: self.raw_y_cursor_position,
            raw_transform: self.raw_transform.clone(),
            down_time_nanos: self.down_time_nanos,
            event_time_nanos: self.event_time_nanos(),
        }
    }

    /// Copy `other`, either with its whole history or only its current sample
    pub fn copy_from(&mut self, other: &MotionEventN, keep_history: bool) {
        self.set_params(other.params());
        self.pointer_properties.clone_from(&other.pointer_properties);

        if keep_history {
            self.sample_event_times.clone_from(&other.sample_event_times);
            self.sample_pointer_coords
                .clone_from(&other.sample_pointer_coords);
        } else {
            self.sample_event_times.clear();
            self.sample_event_times.push(other.event_time_nanos());
            let count = other.pointer_count();
            let start = other.sample_pointer_coords.len() - count;
            self.sample_pointer_coords.clear();
            self.sample_pointer_coords
                .extend_from_slice(&other.sample_pointer_coords[start..]);
        }
    }

    /// Append a sample of raw coordinates, one per pointer
    pub fn add_sample(&mut self, event_time_nanos: i64, coords: &[PointerCoords]) -> Result<(), MotionError> {
        if coords.len() != self.pointer_count() {
            return Err(MotionError::PointerCountMismatch {
                properties: self.pointer_count(),
                coords: coords.len(),
            });
        }
        self.push_sample(event_time_nanos, coords);
        Ok(())
    }

    fn push_sample(&mut self, event_time_nanos: i64, coords: &[PointerCoords]) {
        self.sample_event_times.push(event_time_nanos);
        self.sample_pointer_coords.extend_from_slice(coords);
    }

    // ========================================================================
    // Event fields
    // ========================================================================

    #[inline]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[inline]
    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    #[inline]
    pub fn source(&self) -> Source {
        self.source
    }

    pub fn set_source(&mut self, source: Source) {
        self.source = source;
    }

    #[inline]
    pub fn display_id(&self) -> i32 {
        self.display_id
    }

    pub fn set_display_id(&mut self, display_id: i32) {
        self.display_id = display_id;
    }

    #[inline]
    pub fn action(&self) -> i32 {
        self.action
    }

    #[inline]
    pub fn action_masked(&self) -> i32 {
        action_masked(self.action)
    }

    /// Pointer index carried by a pointer-down/up action
    #[inline]
    pub fn action_index(&self) -> usize {
        action_index(self.action)
    }

    pub fn set_action(&mut self, action: i32) {
        self.action = action;
    }

    pub fn action_button(&self) -> Buttons {
        self.action_button
    }

    pub fn set_action_button(&mut self, button: Buttons) {
        self.action_button = button;
    }

    #[inline]
    pub fn flags(&self) -> MotionFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: MotionFlags) {
        self.flags = flags;
    }

    pub fn edge_flags(&self) -> EdgeFlags {
        self.edge_flags
    }

    pub fn set_edge_flags(&mut self, edge_flags: EdgeFlags) {
        self.edge_flags = edge_flags;
    }

    #[inline]
    pub fn meta_state(&self) -> i32 {
        self.meta_state
    }

    pub fn set_meta_state(&mut self, meta_state: i32) {
        self.meta_state = meta_state;
    }

    pub fn button_state(&self) -> Buttons {
        self.button_state
    }

    pub fn set_button_state(&mut self, button_state: Buttons) {
        self.button_state = button_state;
    }

    /// Whether every button in `button` is held
    pub fn is_button_pressed(&self, button: Buttons) -> bool {
        !button.is_empty() && self.button_state.contains(button)
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn raw_transform(&self) -> &Transform {
        &self.raw_transform
    }

    pub fn x_precision(&self) -> f32 {
        self.x_precision
    }

    pub fn y_precision(&self) -> f32 {
        self.y_precision
    }

    /// Window offset applied to logical coordinates
    pub fn x_offset(&self) -> f32 {
        self.transform.tx()
    }

    pub fn y_offset(&self) -> f32 {
        self.transform.ty()
    }

    #[inline]
    pub fn down_time_nanos(&self) -> i64 {
        self.down_time_nanos
    }

    pub fn set_down_time_nanos(&mut self, down_time_nanos: i64) {
        self.down_time_nanos = down_time_nanos;
    }

    /// Time of the current sample
    #[inline]
    pub fn event_time_nanos(&self) -> i64 {
        self.sample_event_times.last().copied().unwrap_or(0)
    }

    /// Time of sample `pos`, or of the current sample for [`HISTORY_CURRENT`]
    pub fn historical_event_time_nanos(&self, pos: usize) -> i64 {
        self.sample_event_times[self.resolve_pos(pos)]
    }

    pub fn is_touch_event(&self) -> bool {
        is_touch_event(self.source, self.action)
    }

    // ========================================================================
    // Pointers and samples
    // ========================================================================

    #[inline]
    pub fn pointer_count(&self) -> usize {
        self.pointer_properties.len()
    }

    /// Number of samples before the current one
    #[inline]
    pub fn history_size(&self) -> usize {
        self.sample_event_times.len().saturating_sub(1)
    }

    pub fn pointer_properties(&self, index: usize) -> &PointerProperties {
        &self.pointer_properties[index]
    }

    pub fn all_pointer_properties(&self) -> &[PointerProperties] {
        &self.pointer_properties
    }

    pub fn pointer_id(&self, index: usize) -> i32 {
        self.pointer_properties[index].id
    }

    pub fn tool_type(&self, index: usize) -> ToolType {
        self.pointer_properties[index].tool_type
    }

    /// Index of the pointer with `id`
    pub fn find_pointer_index(&self, id: i32) -> Option<usize> {
        self.pointer_properties.iter().position(|p| p.id == id)
    }

    /// Ids of every pointer in this event
    pub fn pointer_id_bits(&self) -> BitSet32 {
        let mut bits = BitSet32::default();
        for props in &self.pointer_properties {
            if (0..=MAX_POINTER_ID).contains(&props.id) {
                bits.mark_bit(props.id as u32);
            }
        }
        bits
    }

    #[inline]
    fn resolve_pos(&self, pos: usize) -> usize {
        if pos == HISTORY_CURRENT {
            self.history_size()
        } else {
            pos
        }
    }

    /// Stored (raw) coordinates of pointer `index` at sample `pos`
    pub fn raw_pointer_coords(&self, index: usize, pos: usize) -> &PointerCoords {
        let count = self.pointer_count();
        assert!(index < count, "pointer index {index} out of range ({count} pointers)");
        &self.sample_pointer_coords[self.resolve_pos(pos) * count + index]
    }

    /// Every stored sample, flattened sample-major
    pub fn samples(&self) -> &[PointerCoords] {
        &self.sample_pointer_coords
    }

    // ========================================================================
    // Axis queries
    // ========================================================================

    pub fn axis_value(&self, axis: i32, index: usize) -> Result<f32, MotionError> {
        self.historical_axis_value(axis, index, HISTORY_CURRENT)
    }

    pub fn historical_axis_value(&self, axis: i32, index: usize, pos: usize) -> Result<f32, MotionError> {
        let coords = self.raw_pointer_coords(index, pos);
        calculate_transformed_axis_value(axis, self.source, &self.transform, coords)
    }

    pub fn raw_axis_value(&self, axis: i32, index: usize) -> Result<f32, MotionError> {
        self.historical_raw_axis_value(axis, index, HISTORY_CURRENT)
    }

    pub fn historical_raw_axis_value(&self, axis: i32, index: usize, pos: usize) -> Result<f32, MotionError> {
        let coords = self.raw_pointer_coords(index, pos);
        calculate_transformed_axis_value(axis, self.source, &self.raw_transform, coords)
    }

    /// Logical-space coordinates of pointer `index` at sample `pos`
    pub fn transformed_pointer_coords(&self, index: usize, pos: usize) -> PointerCoords {
        calculate_transformed_coords(self.source, &self.transform, self.raw_pointer_coords(index, pos))
    }

    fn logical_xy(&self, index: usize, pos: usize) -> Vec2 {
        transformed_xy(self.source, &self.transform, self.raw_pointer_coords(index, pos))
    }

    fn display_xy(&self, index: usize, pos: usize) -> Vec2 {
        transformed_xy(self.source, &self.raw_transform, self.raw_pointer_coords(index, pos))
    }

    pub fn x(&self, index: usize) -> f32 {
        self.logical_xy(index, HISTORY_CURRENT).x
    }

    pub fn y(&self, index: usize) -> f32 {
        self.logical_xy(index, HISTORY_CURRENT).y
    }

    pub fn historical_x(&self, index: usize, pos: usize) -> f32 {
        self.logical_xy(index, pos).x
    }

    pub fn historical_y(&self, index: usize, pos: usize) -> f32 {
        self.logical_xy(index, pos).y
    }

    pub fn raw_x(&self, index: usize) -> f32 {
        self.display_xy(index, HISTORY_CURRENT).x
    }

    pub fn raw_y(&self, index: usize) -> f32 {
        self.display_xy(index, HISTORY_CURRENT).y
    }

    pub fn historical_raw_x(&self, index: usize, pos: usize) -> f32 {
        self.display_xy(index, pos).x
    }

    pub fn historical_raw_y(&self, index: usize, pos: usize) -> f32 {
        self.display_xy(index, pos).y
    }

    pub fn pressure(&self, index: usize) -> f32 {
        self.raw_pointer_coords(index, HISTORY_CURRENT).pressure
    }

    pub fn size(&self, index: usize) -> f32 {
        self.raw_pointer_coords(index, HISTORY_CURRENT).size
    }

    pub fn touch_major(&self, index: usize) -> f32 {
        self.raw_pointer_coords(index, HISTORY_CURRENT).touch_major
    }

    pub fn touch_minor(&self, index: usize) -> f32 {
        self.raw_pointer_coords(index, HISTORY_CURRENT).touch_minor
    }

    pub fn tool_major(&self, index: usize) -> f32 {
        self.raw_pointer_coords(index, HISTORY_CURRENT).tool_major
    }

    pub fn tool_minor(&self, index: usize) -> f32 {
        self.raw_pointer_coords(index, HISTORY_CURRENT).tool_minor
    }

    pub fn orientation(&self, index: usize) -> f32 {
        transform_angle(&self.transform, self.raw_pointer_coords(index, HISTORY_CURRENT).orientation)
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    pub fn raw_x_cursor_position(&self) -> f32 {
        self.raw_x_cursor_position
    }

    pub fn raw_y_cursor_position(&self) -> f32 {
        self.raw_y_cursor_position
    }

    pub fn is_cursor_position_valid(&self) -> bool {
        !self.raw_x_cursor_position.is_nan() && !self.raw_y_cursor_position.is_nan()
    }

    fn cursor_position(&self) -> Vec2 {
        self.transform
            .transform_xy(self.raw_x_cursor_position, self.raw_y_cursor_position)
    }

    /// Cursor x in logical space (NaN without a cursor)
    pub fn x_cursor_position(&self) -> f32 {
        round_transformed_coords(self.cursor_position().x)
    }

    pub fn y_cursor_position(&self) -> f32 {
        round_transformed_coords(self.cursor_position().y)
    }

    /// Set the cursor from logical coordinates; it is stored in raw space
    pub fn set_cursor_position(&mut self, x: f32, y: f32) {
        let raw = self.transform.inverse().transform_xy(x, y);
        self.raw_x_cursor_position = raw.x;
        self.raw_y_cursor_position = raw.y;
    }

    pub(crate) fn invalidate_cursor_position(&mut self) {
        self.raw_x_cursor_position = INVALID_CURSOR_POSITION;
        self.raw_y_cursor_position = INVALID_CURSOR_POSITION;
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Shift logical coordinates without touching stored samples
    pub fn offset_location(&mut self, dx: f32, dy: f32) {
        let tx = self.transform.tx() + dx;
        let ty = self.transform.ty() + dy;
        self.transform.set_translation(tx, ty);
    }

    /// Scale both offsets, the precisions and every stored sample
    pub fn scale(&mut self, factor: f32) {
        let (tx, ty) = (self.transform.tx(), self.transform.ty());
        self.transform.set_translation(tx * factor, ty * factor);
        let (rx, ry) = (self.raw_transform.tx(), self.raw_transform.ty());
        self.raw_transform.set_translation(rx * factor, ry * factor);
        self.x_precision *= factor;
        self.y_precision *= factor;

        for coords in &mut self.sample_pointer_coords {
            coords.scale(factor, factor, factor);
        }
    }

    /// Compose `matrix` after the logical transform; samples stay raw
    pub fn transform_by(&mut self, matrix: &impl RowMajor3x3) {
        let next = Transform::from_matrix(matrix);
        self.transform = &next * &self.transform;
    }

    /// Bake `matrix` into every stored sample and a valid cursor position
    pub fn apply_transform(&mut self, matrix: &impl RowMajor3x3) {
        let transform = Transform::from_matrix(matrix);
        for coords in &mut self.sample_pointer_coords {
            coords.transform(&transform);
        }

        if self.is_cursor_position_valid() {
            let cursor = transform.transform_xy(self.raw_x_cursor_position, self.raw_y_cursor_position);
            self.raw_x_cursor_position = cursor.x;
            self.raw_y_cursor_position = cursor.y;
        }
    }
}

fn validate_pointers(properties: &[PointerProperties], coords: &[PointerCoords]) -> Result<(), MotionError> {
    if properties.len() != coords.len() {
        return Err(MotionError::PointerCountMismatch {
            properties: properties.len(),
            coords: coords.len(),
        });
    }
    if properties.is_empty() {
        return Err(MotionError::NoPointers);
    }
    if properties.len() > MAX_POINTERS {
        return Err(MotionError::TooManyPointers(properties.len()));
    }

    let mut seen = BitSet32::default();
    for props in properties {
        if !(0..=MAX_POINTER_ID).contains(&props.id) || seen.has_bit(props.id as u32) {
            return Err(MotionError::InvalidPointerId(props.id));
        }
        seen.mark_bit(props.id as u32);
    }
    Ok(())
}

impl fmt::Display for MotionEventN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MotionEvent {{ action={}", action_to_string(self.action))?;
        if !self.action_button.is_empty() {
            write!(f, ", actionButton={:?}", self.action_button)?;
        }
        for i in 0..self.pointer_count() {
            write!(
                f,
                ", id[{i}]={}, x[{i}]={}, y[{i}]={}, toolType[{i}]={}",
                self.pointer_id(i),
                self.x(i),
                self.y(i),
                self.tool_type(i).as_str()
            )?;
        }
        write!(
            f,
            ", buttonState={:?}, classification={}, metaState={}, flags={:#x}, edgeFlags={:#x}, \
             pointerCount={}, historySize={}, eventTime={}, downTime={}, deviceId={}, \
             source={:#x}, displayId={} }}",
            self.button_state,
            self.classification.as_str(),
            self.meta_state,
            self.flags.bits(),
            self.edge_flags.bits(),
            self.pointer_count(),
            self.history_size(),
            self.event_time_nanos(),
            self.down_time_nanos,
            self.device_id,
            self.source.bits(),
            self.display_id
        )
    }
}
