use super::to_dto;
use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        paging::Page,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::{
    get_expert_bookings, get_user_bookings, BookingFilterParams, BookingPageResponse,
    PagedResponse,
};
use consultation_booking_domain::{
    date::{local_day_bounds, parse_date},
    Actor, ActorRole, ID,
};
use consultation_booking_infra::{BookingContext, BookingPage, BookingQuery};

fn respond(ctx: &BookingContext, res: ListedBookings) -> HttpResponse {
    let items = res
        .bookings
        .bookings
        .into_iter()
        .map(|b| to_dto(ctx, b))
        .collect();
    HttpResponse::Ok().json(BookingPageResponse::new(PagedResponse {
        items,
        total: res.bookings.total,
        page: res.page.page,
        limit: res.page.limit,
    }))
}

pub async fn get_user_bookings_controller(
    http_req: HttpRequest,
    path: web::Path<get_user_bookings::PathParams>,
    query: web::Query<get_user_bookings::QueryParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = GetBookingsUseCase {
        actor,
        owner: BookingOwner::User(path.user_id.clone()),
        filter: query.0,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|res| respond(&ctx, res))
        .map_err(BookingError::from)
}

pub async fn get_expert_bookings_controller(
    http_req: HttpRequest,
    path: web::Path<get_expert_bookings::PathParams>,
    query: web::Query<get_expert_bookings::QueryParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = GetBookingsUseCase {
        actor,
        owner: BookingOwner::Expert(path.expert_id.clone()),
        filter: query.0,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|res| respond(&ctx, res))
        .map_err(BookingError::from)
}

#[derive(Debug)]
enum BookingOwner {
    User(ID),
    Expert(ID),
}

#[derive(Debug)]
struct GetBookingsUseCase {
    pub actor: Actor,
    pub owner: BookingOwner,
    pub filter: BookingFilterParams,
}

#[derive(Debug)]
struct ListedBookings {
    bookings: BookingPage,
    page: Page,
}

#[derive(Debug)]
enum UseCaseError {
    InvalidFilter(String),
    NotOwner,
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidFilter(msg) => Self::Validation(msg),
            UseCaseError::NotOwner => {
                Self::Forbidden("You are not allowed to list these bookings.".into())
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

impl GetBookingsUseCase {
    fn query(&self, ctx: &BookingContext) -> Result<(BookingQuery, Page), UseCaseError> {
        let page =
            Page::new(self.filter.page, self.filter.limit).map_err(UseCaseError::InvalidFilter)?;
        let tz = &ctx.config.timezone;
        let bounds = |date: &Option<String>| match date {
            Some(date) => parse_date(date.trim())
                .ok()
                .and_then(|date| local_day_bounds(&date, tz))
                .map(Some)
                .ok_or_else(|| {
                    UseCaseError::InvalidFilter(format!(
                        "The date: {} is not valid, it should be formatted as YYYY-MM-DD.",
                        date
                    ))
                }),
            None => Ok(None),
        };
        let start_from = bounds(&self.filter.start_date)?.map(|(start, _)| start);
        let start_until = bounds(&self.filter.end_date)?.map(|(_, end)| end);
        if let (Some(from), Some(until)) = (start_from, start_until) {
            if from >= until {
                return Err(UseCaseError::InvalidFilter(
                    "The start_date can not be after the end_date.".into(),
                ));
            }
        }

        let query = BookingQuery {
            status: self.filter.status,
            mode: self.filter.mode,
            start_from,
            start_until,
            skip: page.skip(),
            limit: page.limit,
        };
        Ok((query, page))
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetBookingsUseCase {
    type Response = ListedBookings;

    type Error = UseCaseError;

    const NAME: &'static str = "GetBookings";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let allowed = match &self.owner {
            BookingOwner::User(user_id) => {
                self.actor.is_admin()
                    || (self.actor.role == ActorRole::User && self.actor.id == *user_id)
            }
            BookingOwner::Expert(expert_id) => self.actor.acts_for_expert(expert_id),
        };
        if !allowed {
            return Err(UseCaseError::NotOwner);
        }
        let (query, page) = self.query(ctx)?;

        let bookings = match &self.owner {
            BookingOwner::User(user_id) => {
                bounded(ctx, ctx.repos.bookings.find_by_user(user_id, &query)).await
            }
            BookingOwner::Expert(expert_id) => {
                bounded(ctx, ctx.repos.bookings.find_by_expert(expert_id, &query)).await
            }
        }
        .map_err(UseCaseError::Storage)?;

        Ok(ListedBookings { bookings, page })
    }
}

impl PermissionBoundary for GetBookingsUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ReadBookings]
    }
}
