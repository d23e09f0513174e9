use consultation_booking_domain::BookingStatusChanged;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

/// Sink for booking status change notifications. Publishing happens after
/// the change is committed and must never fail the operation.
pub trait IBookingEventPublisher: Send + Sync {
    fn publish(&self, event: BookingStatusChanged);
}

/// Emits every status change as a structured log line
pub struct TracingBookingEventPublisher {}

impl IBookingEventPublisher for TracingBookingEventPublisher {
    fn publish(&self, event: BookingStatusChanged) {
        info!(
            booking_id = %event.booking.id,
            expert_id = %event.booking.expert_id,
            user_id = %event.booking.user_id,
            from = event.from.map(|s| s.as_str()).unwrap_or("none"),
            to = event.to.as_str(),
            actor_id = %event.actor.id,
            actor_role = event.actor.role.as_str(),
            "Booking status changed"
        );
    }
}

/// Forwards every status change to an in-process receiver
pub struct ChannelBookingEventPublisher {
    sender: UnboundedSender<BookingStatusChanged>,
}

impl ChannelBookingEventPublisher {
    pub fn new() -> (Self, UnboundedReceiver<BookingStatusChanged>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl IBookingEventPublisher for ChannelBookingEventPublisher {
    fn publish(&self, event: BookingStatusChanged) {
        if self.sender.send(event).is_err() {
            warn!("Booking event receiver is gone, dropping event");
        }
    }
}
