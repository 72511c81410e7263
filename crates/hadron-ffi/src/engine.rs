//! Engine lifecycle across the C ABI: start, sync, step count, stop.
//!
//! Engines are stored as `Arc<DynEngine>` so concurrent syncs from
//! several C threads only hold the table lock long enough to clone the
//! `Arc`; the engine's own barrier serializes the copies.

use std::sync::{Arc, Mutex};
use std::thread;

use hadron_core::{Link, Parameters, ParticleInfo};
use hadron_engine::{DynEngine, EngineConfig};

use crate::handle::HandleTable;
use crate::status::HadronStatus;
use crate::types::{HadronLink, HadronParameters, HadronParticleInfo, HadronWorkerMetrics};

static ENGINES: Mutex<HandleTable<Arc<DynEngine>>> = Mutex::new(HandleTable::new());

/// Clone the engine behind `handle` out of the table.
fn get_engine(handle: u64) -> Option<Arc<DynEngine>> {
    ENGINES.lock().ok()?.get(handle).cloned()
}

/// Borrow `len` elements at `ptr`. A null `ptr` is accepted only for
/// `len == 0`.
#[allow(unsafe_code)]
fn borrow_slice<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    // SAFETY: caller guarantees `ptr` points to `len` initialized values
    // that outlive this call.
    Some(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Mutable counterpart of [`borrow_slice`].
#[allow(unsafe_code)]
fn borrow_slice_mut<'a, T>(ptr: *mut T, len: usize) -> Option<&'a mut [T]> {
    if len == 0 {
        return Some(&mut []);
    }
    if ptr.is_null() {
        return None;
    }
    // SAFETY: caller guarantees `ptr` points to `len` initialized values,
    // exclusively borrowed for the duration of this call.
    Some(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

fn convert_infos(infos: &[HadronParticleInfo]) -> Vec<ParticleInfo> {
    infos.iter().map(ParticleInfo::from).collect()
}

/// Wait until no sync holds a clone of `engine`, then take ownership.
fn into_unique(mut engine: Arc<DynEngine>) -> DynEngine {
    loop {
        match Arc::try_unwrap(engine) {
            Ok(owned) => return owned,
            Err(shared) => {
                engine = shared;
                thread::yield_now();
            }
        }
    }
}

// ── Lifecycle ───────────────────────────────────────────────────

/// Write the default input parameters and zeroed outputs into `*out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hadron_parameters_default(out: *mut HadronParameters) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return HadronStatus::InvalidArgument as i32;
        }
        // SAFETY: `out` is non-null and caller guarantees it is writable.
        unsafe { *out = HadronParameters::from(&Parameters::default()) };
        HadronStatus::Ok as i32
    })
}

/// Start an engine of `dimension` (1, 2, or 3) on a background worker.
///
/// `particle_data` holds `particle_count` records of `2 * dimension`
/// values (position then velocity); `particle_data_len` must equal
/// `particle_count * 2 * dimension`. `infos` holds `particle_count`
/// entries and `links` holds `link_count`. All inputs are copied; the
/// caller keeps ownership. On success the new handle is written to
/// `*handle_out`.
#[no_mangle]
#[allow(unsafe_code, clippy::too_many_arguments)]
pub extern "C" fn hadron_engine_start(
    params: *const HadronParameters,
    dimension: u32,
    particle_data: *const f64,
    particle_data_len: usize,
    particle_count: usize,
    infos: *const HadronParticleInfo,
    link_count: usize,
    links: *const HadronLink,
    handle_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if params.is_null() || handle_out.is_null() {
            return HadronStatus::InvalidArgument as i32;
        }
        // SAFETY: `params` is non-null and caller guarantees it is valid.
        let parameters = Parameters::from(unsafe { &*params });

        let mut engine = match DynEngine::new(dimension as usize, EngineConfig::default()) {
            Ok(e) => e,
            Err(e) => return HadronStatus::from(&e) as i32,
        };

        let expected_len = particle_count.checked_mul(2 * dimension as usize);
        if expected_len != Some(particle_data_len) {
            return HadronStatus::BufferLengthMismatch as i32;
        }
        let (Some(data), Some(infos), Some(raw_links)) = (
            borrow_slice(particle_data, particle_data_len),
            borrow_slice(infos, particle_count),
            borrow_slice(links, link_count),
        ) else {
            return HadronStatus::InvalidArgument as i32;
        };
        let Some(links) = raw_links
            .iter()
            .map(|l| l.to_link())
            .collect::<Option<Vec<Link>>>()
        else {
            return HadronStatus::LinkOutOfRange as i32;
        };

        if let Err(e) = engine.start(&parameters, data, &convert_infos(infos), &links) {
            return HadronStatus::from(&e) as i32;
        }

        let Some(handle) = ffi_lock!(ENGINES).insert(Arc::new(engine)) else {
            return HadronStatus::InternalError as i32;
        };
        // SAFETY: `handle_out` is non-null and caller guarantees it is writable.
        unsafe { *handle_out = handle };
        HadronStatus::Ok as i32
    })
}

/// Exchange state with a running engine.
///
/// Copies the caller's inputs and fixed particles in and the engine's
/// latest results out, as described for `Engine::sync`. `particle_data`
/// must have the length given at start; `infos` holds `particle_count`
/// entries.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hadron_engine_sync(
    handle: u64,
    params: *mut HadronParameters,
    particle_data: *mut f64,
    particle_data_len: usize,
    infos: *const HadronParticleInfo,
    particle_count: usize,
) -> i32 {
    ffi_guard!({
        let Some(engine) = get_engine(handle) else {
            return HadronStatus::InvalidHandle as i32;
        };
        if params.is_null() {
            return HadronStatus::InvalidArgument as i32;
        }
        let (Some(data), Some(infos)) = (
            borrow_slice_mut(particle_data, particle_data_len),
            borrow_slice(infos, particle_count),
        ) else {
            return HadronStatus::InvalidArgument as i32;
        };

        // SAFETY: `params` is non-null and caller guarantees it is valid
        // for reads and writes.
        let mut parameters = Parameters::from(unsafe { &*params });
        if let Err(e) = engine.sync(&mut parameters, data, &convert_infos(infos)) {
            return HadronStatus::from(&e) as i32;
        }
        // SAFETY: as above.
        unsafe { *params = HadronParameters::from(&parameters) };
        HadronStatus::Ok as i32
    })
}

/// Steps completed since start, or 0 for an invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hadron_engine_step_count(handle: u64) -> i64 {
    ffi_guard_or!(0, {
        get_engine(handle)
            .map(|e| i64::try_from(e.step_count()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    })
}

/// Write the step count to `*out`, distinguishing an invalid handle from
/// a count of zero.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hadron_engine_step_count_get(handle: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return HadronStatus::InvalidArgument as i32;
        }
        let Some(engine) = get_engine(handle) else {
            return HadronStatus::InvalidHandle as i32;
        };
        // SAFETY: `out` is non-null and caller guarantees it is writable.
        unsafe { *out = engine.step_count() };
        HadronStatus::Ok as i32
    })
}

/// Write the worker's counters as of its latest flush to `*out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hadron_engine_metrics_get(handle: u64, out: *mut HadronWorkerMetrics) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return HadronStatus::InvalidArgument as i32;
        }
        let Some(engine) = get_engine(handle) else {
            return HadronStatus::InvalidHandle as i32;
        };
        match engine.metrics() {
            Ok(m) => {
                // SAFETY: `out` is non-null and caller guarantees it is writable.
                unsafe { *out = HadronWorkerMetrics::from(&m) };
                HadronStatus::Ok as i32
            }
            Err(e) => HadronStatus::from(&e) as i32,
        }
    })
}

/// Stop the worker, join it, and release the engine. The handle becomes
/// invalid; stopping it again returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hadron_engine_stop(handle: u64) -> i32 {
    ffi_guard!({
        let Some(engine) = ffi_lock!(ENGINES).remove(handle) else {
            return HadronStatus::InvalidHandle as i32;
        };
        let mut engine = into_unique(engine);
        match engine.stop() {
            Ok(_) => HadronStatus::Ok as i32,
            Err(e) => HadronStatus::from(&e) as i32,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hadron_core::StateLayout;
    use hadron_test_utils::{two_particles, wait_until};
    use std::time::Duration;

    fn c_params() -> HadronParameters {
        let mut p = HadronParameters::from(&Parameters::default());
        p.particle_attraction = 0.0;
        p
    }

    fn c_infos(infos: &[ParticleInfo]) -> Vec<HadronParticleInfo> {
        infos
            .iter()
            .map(|i| HadronParticleInfo {
                mass: i.mass,
                fixed: u8::from(i.fixed),
            })
            .collect()
    }

    fn c_links(links: &[Link]) -> Vec<HadronLink> {
        links
            .iter()
            .map(|l| HadronLink {
                a: l.a as i32,
                b: l.b as i32,
                strength: l.strength,
            })
            .collect()
    }

    fn start_two(params: &HadronParameters) -> (u64, Vec<f64>, Vec<HadronParticleInfo>) {
        let fixture = two_particles::<2>();
        let infos = c_infos(&fixture.infos);
        let links = c_links(&fixture.links);
        let mut handle = 0u64;
        let status = hadron_engine_start(
            params,
            2,
            fixture.particle_data.as_ptr(),
            fixture.particle_data.len(),
            fixture.particle_count(),
            infos.as_ptr(),
            links.len(),
            links.as_ptr(),
            &mut handle,
        );
        assert_eq!(status, HadronStatus::Ok as i32);
        (handle, fixture.particle_data, infos)
    }

    #[test]
    fn start_sync_stop_lifecycle() {
        let mut params = c_params();
        let (handle, mut data, infos) = start_two(&params);

        assert!(wait_until(Duration::from_secs(5), || {
            hadron_engine_step_count(handle) > 0
        }));
        let mut steps = 0u64;
        assert_eq!(
            hadron_engine_step_count_get(handle, &mut steps),
            HadronStatus::Ok as i32
        );
        assert!(steps > 0);

        let status = hadron_engine_sync(
            handle,
            &mut params,
            data.as_mut_ptr(),
            data.len(),
            infos.as_ptr(),
            infos.len(),
        );
        assert_eq!(status, HadronStatus::Ok as i32);
        assert_eq!(StateLayout::<2>::position(&data, 0).0, [0.0, 0.0]);

        let mut metrics = HadronWorkerMetrics::default();
        assert_eq!(
            hadron_engine_metrics_get(handle, &mut metrics),
            HadronStatus::Ok as i32
        );

        assert_eq!(hadron_engine_stop(handle), HadronStatus::Ok as i32);
    }

    #[test]
    fn stopped_handle_is_rejected() {
        let params = c_params();
        let (handle, mut data, infos) = start_two(&params);
        assert_eq!(hadron_engine_stop(handle), HadronStatus::Ok as i32);

        assert_eq!(hadron_engine_stop(handle), HadronStatus::InvalidHandle as i32);
        assert_eq!(hadron_engine_step_count(handle), 0);
        let mut out = 0u64;
        assert_eq!(
            hadron_engine_step_count_get(handle, &mut out),
            HadronStatus::InvalidHandle as i32
        );
        let mut params = params;
        assert_eq!(
            hadron_engine_sync(
                handle,
                &mut params,
                data.as_mut_ptr(),
                data.len(),
                infos.as_ptr(),
                infos.len(),
            ),
            HadronStatus::InvalidHandle as i32
        );
    }

    #[test]
    fn bad_start_arguments() {
        let params = c_params();
        let data = [0.0f64; 4];
        let infos = [HadronParticleInfo { mass: 1.0, fixed: 0 }; 1];
        let mut handle = 0u64;

        let start = |dimension: u32, len: usize, links: &[HadronLink], out: *mut u64| {
            hadron_engine_start(
                &params,
                dimension,
                data.as_ptr(),
                len,
                1,
                infos.as_ptr(),
                links.len(),
                links.as_ptr(),
                out,
            )
        };

        assert_eq!(start(4, 8, &[], &mut handle), HadronStatus::InvalidDimension as i32);
        assert_eq!(start(0, 0, &[], &mut handle), HadronStatus::InvalidDimension as i32);
        assert_eq!(start(2, 3, &[], &mut handle), HadronStatus::BufferLengthMismatch as i32);
        assert_eq!(
            start(2, 4, &[], std::ptr::null_mut()),
            HadronStatus::InvalidArgument as i32
        );
        let negative = [HadronLink { a: -1, b: 0, strength: 1.0 }];
        assert_eq!(start(2, 4, &negative, &mut handle), HadronStatus::LinkOutOfRange as i32);
        let beyond = [HadronLink { a: 0, b: 5, strength: 1.0 }];
        assert_eq!(start(2, 4, &beyond, &mut handle), HadronStatus::LinkOutOfRange as i32);
    }

    #[test]
    fn sync_rejects_wrong_lengths() {
        let mut params = c_params();
        let (handle, mut data, infos) = start_two(&params);

        assert_eq!(
            hadron_engine_sync(
                handle,
                &mut params,
                data.as_mut_ptr(),
                data.len() - 1,
                infos.as_ptr(),
                infos.len(),
            ),
            HadronStatus::BufferLengthMismatch as i32
        );
        assert_eq!(
            hadron_engine_sync(
                handle,
                std::ptr::null_mut(),
                data.as_mut_ptr(),
                data.len(),
                infos.as_ptr(),
                infos.len(),
            ),
            HadronStatus::InvalidArgument as i32
        );
        assert_eq!(hadron_engine_stop(handle), HadronStatus::Ok as i32);
    }

    #[test]
    fn default_parameters_are_written() {
        let mut p = HadronParameters::from(&Parameters {
            input: hadron_core::InputParameters {
                viscosity: 0.0,
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(hadron_parameters_default(&mut p), HadronStatus::Ok as i32);
        assert_eq!(p.viscosity, 10.0);
        assert_eq!(p.step_count, 0);
        assert_eq!(
            hadron_parameters_default(std::ptr::null_mut()),
            HadronStatus::InvalidArgument as i32
        );
    }
}
