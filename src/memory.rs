use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(statm_resident)]
use once_cell::sync::Lazy;

static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);

/// `GlobalAlloc` wrapper over the system allocator that counts live heap bytes.
///
/// Install it with `#[global_allocator]` to make [`AllocatorProbe`] report
/// anything other than zero.
pub struct TrackingAllocator;

impl TrackingAllocator {
    pub const fn system() -> Self {
        TrackingAllocator
    }
}

#[inline]
fn grow(bytes: usize) {
    LIVE_BYTES.fetch_add(bytes, Ordering::Relaxed);
}

#[inline]
fn shrink(bytes: usize) {
    LIVE_BYTES.fetch_sub(bytes, Ordering::Relaxed);
}

// SAFETY: every call forwards to `System` with the caller's layout; the
// counters are plain atomics and never allocate.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            grow(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            grow(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        shrink(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                grow(new_size - layout.size());
            } else {
                shrink(layout.size() - new_size);
            }
        }
        new_ptr
    }
}

/// Heap bytes currently live through [`TrackingAllocator`].
pub fn live_bytes() -> usize {
    LIVE_BYTES.load(Ordering::Relaxed)
}

/// Source of the memory reading bracketing each trial.
pub trait MemoryProbe {
    /// Current memory in use, in bytes.
    fn read(&self) -> usize;
}

impl<P: MemoryProbe + ?Sized> MemoryProbe for &P {
    fn read(&self) -> usize {
        (**self).read()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AllocatorProbe;

impl MemoryProbe for AllocatorProbe {
    fn read(&self) -> usize {
        live_bytes()
    }
}

/// Resident set size of the whole process. Subject to the OS returning
/// pages between readings, so deltas can come out negative.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResidentProbe;

impl MemoryProbe for ResidentProbe {
    fn read(&self) -> usize {
        match resident_bytes() {
            Some(bytes) => bytes,
            None => {
                tracing::warn!("resident memory unavailable, reading 0");
                0
            }
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProbeKind {
    #[default]
    Allocator,
    Resident,
}

impl MemoryProbe for ProbeKind {
    fn read(&self) -> usize {
        match self {
            ProbeKind::Allocator => AllocatorProbe.read(),
            ProbeKind::Resident => ResidentProbe.read(),
        }
    }
}

#[cfg(statm_resident)]
static PAGE_SIZE: Lazy<usize> = Lazy::new(|| {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        4096
    }
});

#[cfg(statm_resident)]
fn resident_bytes() -> Option<usize> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let pages: usize = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(pages * *PAGE_SIZE)
}

// Peak RSS only; the best getrusage offers.
#[cfg(all(unix, not(statm_resident)))]
fn resident_bytes() -> Option<usize> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
    // SAFETY: getrusage fills the struct we hand it.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    // SAFETY: rc == 0 means the struct was written.
    let raw = unsafe { usage.assume_init() }.ru_maxrss as usize;
    if cfg!(target_os = "macos") {
        Some(raw)
    } else {
        Some(raw * 1024)
    }
}

#[cfg(not(any(unix, statm_resident)))]
fn resident_bytes() -> Option<usize> {
    None
}
