mod availability_cache;
mod event_publisher;
mod slot_lock;

pub use availability_cache::AvailabilityCache;
pub use event_publisher::{
    ChannelBookingEventPublisher, IBookingEventPublisher, TracingBookingEventPublisher,
};
pub use slot_lock::{LockOutcome, SlotLock, SlotLockGuard};
