/// Best-effort page locking for secrets while they are in use.
///
/// Keeps passwords and derived keys out of swap on OSes that support it.
/// Not a complete mitigation: small buffers share pages with unrelated
/// allocations, and the OS may refuse to lock at all. A failed lock is
/// silently tolerated; the guard then does nothing.
pub struct MemoryLock {
    ptr: *const u8,
    len: usize,
    locked: bool,
}

impl MemoryLock {
    pub fn lock(bytes: &[u8]) -> Self {
        let (ptr, len) = (bytes.as_ptr(), bytes.len());
        let locked = len != 0 && lock_pages(ptr, len);
        Self { ptr, len, locked }
    }
}

impl Drop for MemoryLock {
    fn drop(&mut self) {
        if self.locked {
            unlock_pages(self.ptr, self.len);
        }
    }
}

#[cfg(unix)]
fn lock_pages(ptr: *const u8, len: usize) -> bool {
    unsafe { libc::mlock(ptr as *const core::ffi::c_void, len) == 0 }
}

#[cfg(unix)]
fn unlock_pages(ptr: *const u8, len: usize) {
    unsafe {
        libc::munlock(ptr as *const core::ffi::c_void, len);
    }
}

#[cfg(windows)]
fn lock_pages(ptr: *const u8, len: usize) -> bool {
    use windows_sys::Win32::System::Memory::VirtualLock;
    unsafe { VirtualLock(ptr as *const core::ffi::c_void, len) != 0 }
}

#[cfg(windows)]
fn unlock_pages(ptr: *const u8, len: usize) {
    use windows_sys::Win32::System::Memory::VirtualUnlock;
    unsafe {
        VirtualUnlock(ptr as *const core::ffi::c_void, len);
    }
}

#[cfg(not(any(unix, windows)))]
fn lock_pages(_ptr: *const u8, _len: usize) -> bool {
    false
}

#[cfg(not(any(unix, windows)))]
fn unlock_pages(_ptr: *const u8, _len: usize) {}
