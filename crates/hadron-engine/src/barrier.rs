//! The barrier: the only state both the worker and callers touch.
//!
//! Every access goes through the single `Mutex<Barrier>` held in
//! [`Shared`](crate::worker::Shared). Both exchanges are linear copies;
//! no force evaluation happens under the lock.

use std::sync::{Mutex, MutexGuard};

use hadron_core::{InputParameters, OutputParameters, Parameters, ParticleInfo, StateLayout};

use crate::metrics::WorkerMetrics;

/// Particle snapshot and parameter slots exchanged under lock.
#[derive(Debug)]
pub(crate) struct Barrier<const D: usize> {
    pub particle_data: Vec<f64>,
    pub infos: Vec<ParticleInfo>,
    /// Inputs written by the last sync, consumed at the next flush.
    pub pending_input: InputParameters,
    /// Outputs published by the last flush.
    pub output: OutputParameters,
    pub metrics: WorkerMetrics,
}

impl<const D: usize> Barrier<D> {
    pub fn new(particle_data: Vec<f64>, infos: Vec<ParticleInfo>, parameters: &Parameters) -> Self {
        Self {
            particle_data,
            infos,
            pending_input: parameters.input,
            output: parameters.output,
            metrics: WorkerMetrics::default(),
        }
    }

    /// Worker side of the exchange.
    ///
    /// Fixed particles flow barrier → working, free particles flow
    /// working → barrier. Fixed flags and pending inputs are taken from
    /// the barrier; live outputs are published to it.
    pub fn flush(
        &mut self,
        working: &mut [f64],
        working_infos: &mut [ParticleInfo],
        live_input: &mut InputParameters,
        live_output: &OutputParameters,
    ) {
        for (i, info) in self.infos.iter().enumerate() {
            working_infos[i].fixed = info.fixed;
            if info.fixed {
                StateLayout::<D>::record_mut(working, i)
                    .copy_from_slice(StateLayout::<D>::record(&self.particle_data, i));
            } else {
                StateLayout::<D>::record_mut(&mut self.particle_data, i)
                    .copy_from_slice(StateLayout::<D>::record(working, i));
            }
        }
        *live_input = self.pending_input;
        self.output = *live_output;
    }

    /// Caller side of the exchange.
    ///
    /// The caller's fixed flags are recorded; fixed particles flow
    /// caller → barrier and free particles barrier → caller. Input
    /// parameters are queued for the next flush and the last published
    /// outputs are returned.
    pub fn sync(
        &mut self,
        parameters: &mut Parameters,
        caller: &mut [f64],
        caller_infos: &[ParticleInfo],
    ) {
        for (i, info) in caller_infos.iter().enumerate() {
            self.infos[i].fixed = info.fixed;
            if info.fixed {
                StateLayout::<D>::record_mut(&mut self.particle_data, i)
                    .copy_from_slice(StateLayout::<D>::record(caller, i));
            } else {
                StateLayout::<D>::record_mut(caller, i)
                    .copy_from_slice(StateLayout::<D>::record(&self.particle_data, i));
            }
        }
        self.pending_input = parameters.input;
        parameters.output = self.output;
    }
}

/// Lock the barrier, recovering the guard if a previous holder panicked.
///
/// The barrier holds plain copies that are valid after any partial
/// update, so a poisoned lock is logged and used as-is.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("barrier lock poisoned, recovering");
        poisoned.into_inner()
    })
}
