//! Simulated printer: a shared bed model behind one handle per collaborator.
//!
//! Dragging an engaged lever along Y changes the height of the nearest
//! corner by `mm_per_throw` per full endpoint-to-endpoint throw. Moving
//! toward -Y lowers a west corner; the east levers are mirrored.

use std::cell::RefCell;
use std::rc::Rc;

use leveler_traits::{AfterProbe, BedLeveling, BoxError, FeedrateScaling, Motion, Probe, Servos, XyPos};

use crate::error::HwError;

/// Initial state and physical constants of the simulated bed.
#[derive(Debug, Clone)]
pub struct SimBedCfg {
    /// Knob positions ordered SW, NW, NE, SE.
    pub positions: [XyPos; 4],
    /// Initial height error per corner, same order.
    pub heights_mm: [f32; 4],
    pub knob_offset_mm: f32,
    pub mm_per_throw: f32,
    pub homed: bool,
    pub start_z_mm: f32,
    pub west_servo: u8,
    pub east_servo: u8,
    pub engaged_deg: u16,
    /// Probe times out once this many samples have been taken.
    pub probe_timeout_after: Option<u32>,
}

impl Default for SimBedCfg {
    fn default() -> Self {
        Self {
            positions: [
                XyPos::new(40.0, 40.0),
                XyPos::new(40.0, 260.0),
                XyPos::new(260.0, 260.0),
                XyPos::new(260.0, 40.0),
            ],
            heights_mm: [0.0; 4],
            knob_offset_mm: 35.0,
            mm_per_throw: 0.02,
            homed: true,
            start_z_mm: 0.0,
            west_servo: 1,
            east_servo: 3,
            engaged_deg: 90,
            probe_timeout_after: None,
        }
    }
}

#[derive(Debug)]
struct BedModel {
    cfg: SimBedCfg,
    heights: [f32; 4],
    xy: XyPos,
    z: f32,
    homed: bool,
    /// Corner whose knob the engaged lever is sitting in.
    engaged_corner: Option<usize>,
    mesh_enabled: bool,
    feedrate_suspended: bool,
    probe_count: u32,
    move_count: u32,
}

impl BedModel {
    fn nearest_corner(&self, pos: XyPos) -> usize {
        let dist = |p: &XyPos| (p.x - pos.x).powi(2) + (p.y - pos.y).powi(2);
        let mut best = 0;
        for (i, p) in self.cfg.positions.iter().enumerate() {
            if dist(p) < dist(&self.cfg.positions[best]) {
                best = i;
            }
        }
        best
    }

    fn drag_lever(&mut self, from: XyPos, to: XyPos) {
        let Some(corner) = self.engaged_corner else {
            return;
        };
        let per_mm = self.cfg.mm_per_throw / (2.0 * self.cfg.knob_offset_mm);
        let dy = to.y - from.y;
        // positions 2 and 3 are the east knobs
        let dz = if corner >= 2 { -per_mm * dy } else { per_mm * dy };
        self.heights[corner] += dz;
        tracing::trace!(corner, dz, height = self.heights[corner], "sim knob turned");
    }
}

/// Cheap-to-clone handle to one simulated printer.
#[derive(Debug, Clone)]
pub struct SimulatedPrinter {
    bed: Rc<RefCell<BedModel>>,
}

impl SimulatedPrinter {
    pub fn new(cfg: SimBedCfg) -> Self {
        let model = BedModel {
            heights: cfg.heights_mm,
            xy: XyPos::default(),
            z: cfg.start_z_mm,
            homed: cfg.homed,
            engaged_corner: None,
            mesh_enabled: false,
            feedrate_suspended: false,
            probe_count: 0,
            move_count: 0,
            cfg,
        };
        Self {
            bed: Rc::new(RefCell::new(model)),
        }
    }

    pub fn motion(&self) -> SimMotion {
        SimMotion(self.bed.clone())
    }
    pub fn probe(&self) -> SimProbe {
        SimProbe(self.bed.clone())
    }
    pub fn servos(&self) -> SimServos {
        SimServos(self.bed.clone())
    }
    pub fn leveling(&self) -> SimLeveling {
        SimLeveling(self.bed.clone())
    }
    pub fn feedrate(&self) -> SimFeedrate {
        SimFeedrate(self.bed.clone())
    }

    /// Current height error per corner (SW, NW, NE, SE).
    pub fn heights(&self) -> [f32; 4] {
        self.bed.borrow().heights
    }
    pub fn position(&self) -> (XyPos, f32) {
        let b = self.bed.borrow();
        (b.xy, b.z)
    }
    pub fn probe_count(&self) -> u32 {
        self.bed.borrow().probe_count
    }
    pub fn move_count(&self) -> u32 {
        self.bed.borrow().move_count
    }
    pub fn set_homed(&self, homed: bool) {
        self.bed.borrow_mut().homed = homed;
    }
    pub fn set_mesh_enabled(&self, enabled: bool) {
        self.bed.borrow_mut().mesh_enabled = enabled;
    }
    pub fn mesh_enabled(&self) -> bool {
        self.bed.borrow().mesh_enabled
    }
    pub fn feedrate_suspended(&self) -> bool {
        self.bed.borrow().feedrate_suspended
    }
}

pub struct SimMotion(Rc<RefCell<BedModel>>);

impl Motion for SimMotion {
    fn move_to_xy(&mut self, pos: XyPos) -> Result<(), BoxError> {
        let mut b = self.0.borrow_mut();
        if !b.homed {
            return Err(Box::new(HwError::NotHomed));
        }
        let from = b.xy;
        b.drag_lever(from, pos);
        b.xy = pos;
        b.move_count += 1;
        Ok(())
    }

    fn move_to_z(&mut self, z_mm: f32) -> Result<(), BoxError> {
        let mut b = self.0.borrow_mut();
        if !b.homed {
            return Err(Box::new(HwError::NotHomed));
        }
        b.z = z_mm;
        b.move_count += 1;
        Ok(())
    }

    fn current_z(&self) -> f32 {
        self.0.borrow().z
    }

    fn all_axes_homed(&self) -> bool {
        self.0.borrow().homed
    }
}

pub struct SimProbe(Rc<RefCell<BedModel>>);

impl Probe for SimProbe {
    fn probe_at(&mut self, pos: XyPos, _after: AfterProbe, _samples: u8) -> Result<f32, BoxError> {
        let mut b = self.0.borrow_mut();
        if !b.homed {
            return Err(Box::new(HwError::NotHomed));
        }
        if let Some(limit) = b.cfg.probe_timeout_after
            && b.probe_count >= limit
        {
            return Err(Box::new(HwError::ProbeTimeout));
        }
        b.xy = pos;
        b.probe_count += 1;
        let corner = b.nearest_corner(pos);
        Ok(b.heights[corner])
    }
}

pub struct SimServos(Rc<RefCell<BedModel>>);

impl SimServos {
    fn check(&self, index: u8) -> Result<(), BoxError> {
        let b = self.0.borrow();
        if index == b.cfg.west_servo || index == b.cfg.east_servo {
            Ok(())
        } else {
            Err(Box::new(HwError::UnknownServo(index)))
        }
    }
}

impl Servos for SimServos {
    fn set_angle(&mut self, index: u8, degrees: u16) -> Result<(), BoxError> {
        self.check(index)?;
        let mut b = self.0.borrow_mut();
        let engaged = if degrees == b.cfg.engaged_deg {
            Some(b.nearest_corner(b.xy))
        } else {
            None
        };
        b.engaged_corner = engaged;
        Ok(())
    }

    fn detach(&mut self, index: u8) -> Result<(), BoxError> {
        self.check(index)?;
        self.0.borrow_mut().engaged_corner = None;
        Ok(())
    }
}

pub struct SimLeveling(Rc<RefCell<BedModel>>);

impl BedLeveling for SimLeveling {
    fn is_enabled(&self) -> bool {
        self.0.borrow().mesh_enabled
    }
    fn set_enabled(&mut self, enabled: bool) -> Result<(), BoxError> {
        self.0.borrow_mut().mesh_enabled = enabled;
        Ok(())
    }
}

pub struct SimFeedrate(Rc<RefCell<BedModel>>);

impl FeedrateScaling for SimFeedrate {
    fn suspend(&mut self) -> Result<(), BoxError> {
        self.0.borrow_mut().feedrate_suspended = true;
        Ok(())
    }
    fn restore(&mut self) -> Result<(), BoxError> {
        self.0.borrow_mut().feedrate_suspended = false;
        Ok(())
    }
}
