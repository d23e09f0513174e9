use super::{
    change_booking_status::ChangeBookingStatusUseCase, create_booking::CreateBookingUseCase,
};
use crate::shared::usecase::Subscriber;
use consultation_booking_domain::BookingStatusChanged;
use consultation_booking_infra::BookingContext;

pub struct PublishBookingCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateBookingUseCase> for PublishBookingCreated {
    async fn notify(&self, e: &BookingStatusChanged, ctx: &BookingContext) {
        ctx.publisher.publish(e.clone());
    }
}

pub struct PublishStatusChanged;

#[async_trait::async_trait(?Send)]
impl Subscriber<ChangeBookingStatusUseCase> for PublishStatusChanged {
    async fn notify(&self, e: &BookingStatusChanged, ctx: &BookingContext) {
        ctx.publisher.publish(e.clone());
    }
}
