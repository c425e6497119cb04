//! Compositor-side state the shell consumes
//!
//! This module models the collaborators the shell runs on top of: outputs,
//! seats with their pointer and keyboard, client surfaces with their
//! configure hook, connected clients and the binding registry. The shell
//! never renders or marshals protocol; it reads and mutates this state and
//! pushes requests back through [`crate::backend::Backend`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::binding::BindingTable;
use crate::geometry::{Point, Rectangle};

pub mod client;
pub mod output;
pub mod seat;
pub mod surface;

pub use client::{ClientRegistry, DestroyListener};
pub use output::Output;
pub use seat::{ButtonState, KeyState, Keyboard, Pointer, PointerButton, Seat};
pub use surface::{ConfigureHook, Surface};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty), $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Stable small-integer output id, never reused.
    OutputId(u32),
    "output-"
);
id_type!(SeatId(u32), "seat-");
id_type!(SurfaceId(u64), "surface-");
id_type!(ClientId(u64), "client-");

/// Everything the shell knows about the compositor it runs on.
#[derive(Debug, Default)]
pub struct Compositor {
    /// Outputs in enumeration order
    outputs: Vec<Output>,

    /// Seats in enumeration order
    seats: Vec<Seat>,

    /// Live client surfaces
    surfaces: HashMap<SurfaceId, Surface>,

    clients: ClientRegistry,
    bindings: BindingTable,

    next_output_id: u32,
    next_seat_id: u32,
    next_surface_id: u64,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    // === Outputs ===

    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        geometry: Rectangle,
        available_geometry: Rectangle,
    ) -> OutputId {
        let id = OutputId(self.next_output_id);
        self.next_output_id += 1;
        self.outputs
            .push(Output::new(id, name.into(), geometry, available_geometry));
        id
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn output_ids(&self) -> Vec<OutputId> {
        self.outputs.iter().map(Output::id).collect()
    }

    pub fn output(&self, id: OutputId) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id() == id)
    }

    pub fn output_mut(&mut self, id: OutputId) -> Option<&mut Output> {
        self.outputs.iter_mut().find(|o| o.id() == id)
    }

    /// First output, in enumeration order, whose geometry contains the point.
    pub fn output_at(&self, position: Point) -> Option<OutputId> {
        self.outputs
            .iter()
            .find(|o| o.geometry().contains_point(position))
            .map(Output::id)
    }

    // === Seats ===

    pub fn add_seat(&mut self, name: impl Into<String>) -> SeatId {
        let id = SeatId(self.next_seat_id);
        self.next_seat_id += 1;
        self.seats.push(Seat::new(id, name.into()));
        id
    }

    /// Drop a seat. Callers must have ended its grab first.
    pub(crate) fn remove_seat(&mut self, id: SeatId) -> Option<Seat> {
        let index = self.seats.iter().position(|s| s.id() == id)?;
        Some(self.seats.remove(index))
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.seats.iter().map(Seat::id).collect()
    }

    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id() == id)
    }

    pub fn seat_mut(&mut self, id: SeatId) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| s.id() == id)
    }

    pub(crate) fn seats_mut(&mut self) -> impl Iterator<Item = &mut Seat> {
        self.seats.iter_mut()
    }

    /// Pointer positions of every seat, or of the given one only.
    pub fn pointer_positions(&self, seat: Option<SeatId>) -> Vec<Point> {
        self.seats
            .iter()
            .filter(|s| seat.map_or(true, |id| s.id() == id))
            .map(|s| s.pointer().position())
            .collect()
    }

    // === Surfaces ===

    pub fn create_surface(&mut self, client: Option<ClientId>) -> SurfaceId {
        let id = SurfaceId(self.next_surface_id);
        self.next_surface_id += 1;
        self.surfaces.insert(id, Surface::new(id, client));
        id
    }

    pub(crate) fn destroy_surface(&mut self, id: SurfaceId) -> Option<Surface> {
        self.surfaces.remove(&id)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&id)
    }

    /// Surfaces owned by a client, in creation order.
    pub fn surfaces_of(&self, client: ClientId) -> Vec<SurfaceId> {
        let mut ids: Vec<SurfaceId> = self
            .surfaces
            .values()
            .filter(|s| s.client() == Some(client))
            .map(Surface::id)
            .collect();
        ids.sort();
        ids
    }

    // === Clients and bindings ===

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn clients_mut(&mut self) -> &mut ClientRegistry {
        &mut self.clients
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut BindingTable {
        &mut self.bindings
    }
}
