use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;

use crate::error::SqlFacadeError;
use crate::facade::DbFacade;

/// Shared handle to a registered facade. Each facade carries its own lock,
/// so callers of one facade serialize while independent facades never
/// contend.
pub type FacadeHandle = Arc<Mutex<DbFacade>>;

lazy_static! {
    static ref REGISTRY: RwLock<HashMap<String, FacadeHandle>> = RwLock::new(HashMap::new());
}

/// Fetch the facade registered under `name`, constructing it with `init` on
/// first access. First registration wins: once a name resolves, later
/// `init` closures for it are never run.
///
/// # Errors
///
/// Propagates the error from `init`; nothing is registered in that case.
pub fn get_or_init<F>(name: &str, init: F) -> Result<FacadeHandle, SqlFacadeError>
where
    F: FnOnce() -> Result<DbFacade, SqlFacadeError>,
{
    if let Some(handle) = get(name) {
        return Ok(handle);
    }

    let mut map = write_registry();
    // Someone else may have won the race between the read and this lock
    if let Some(handle) = map.get(name) {
        return Ok(Arc::clone(handle));
    }
    let handle: FacadeHandle = Arc::new(Mutex::new(init()?));
    map.insert(name.to_string(), Arc::clone(&handle));
    Ok(handle)
}

/// The facade registered under `name`, if any.
#[must_use]
pub fn get(name: &str) -> Option<FacadeHandle> {
    read_registry().get(name).cloned()
}

fn read_registry() -> RwLockReadGuard<'static, HashMap<String, FacadeHandle>> {
    match REGISTRY.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_registry() -> RwLockWriteGuard<'static, HashMap<String, FacadeHandle>> {
    match REGISTRY.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
