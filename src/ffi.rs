use crate::mobile::{ServerConfig, ServerHandle};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::{Mutex, OnceLock};
use tokio::runtime::Runtime;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static HANDLE: Mutex<Option<ServerHandle>> = Mutex::new(None);

fn get_runtime() -> Option<&'static Runtime> {
    if let Some(rt) = RUNTIME.get() {
        return Some(rt);
    }
    match Runtime::new() {
        Ok(rt) => {
            // Another thread may have won the race; either runtime is fine
            let _ = RUNTIME.set(rt);
            RUNTIME.get()
        }
        Err(e) => {
            eprintln!("refugeroute: failed to create Tokio runtime: {e}");
            None
        }
    }
}

/// # Safety
///
/// `osrm_base_url` must be null or a valid null-terminated C string. Null or
/// empty routes offline with straight lines.
/// Returns the actual port (>0) on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn refugeroute_start(port: u16, osrm_base_url: *const c_char) -> i32 {
    let osrm_base_url = if osrm_base_url.is_null() {
        None
    } else {
        let s = unsafe { CStr::from_ptr(osrm_base_url) }
            .to_string_lossy()
            .into_owned();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    };

    let config = ServerConfig {
        port,
        osrm_base_url,
        refuges_path: None,
    };

    let Some(rt) = get_runtime() else {
        return -1;
    };
    match rt.block_on(crate::mobile::start_server(config)) {
        Ok(handle) => {
            let port = handle.port as i32;
            if let Ok(mut guard) = HANDLE.lock() {
                // Replacing a running server shuts the old one down
                if let Some(old) = guard.replace(handle) {
                    let _ = old.shutdown_tx.send(());
                }
            }
            port
        }
        Err(e) => {
            eprintln!("refugeroute_start failed: {e}");
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn refugeroute_stop() {
    if let Ok(mut guard) = HANDLE.lock() {
        if let Some(handle) = guard.take() {
            let _ = handle.shutdown_tx.send(());
        }
    }
}
