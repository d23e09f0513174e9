use crate::{
    error::BookingError,
    shared::{
        deadline::bounded,
        paging::Page,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpResponse};
use consultation_booking_api_structs::{get_experts, get_experts_by_expertise};
use consultation_booking_domain::Expert;
use consultation_booking_infra::BookingContext;

pub async fn get_experts_controller(
    query: web::Query<get_experts::QueryParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let query = query.into_inner();
    let filter = match query.email {
        Some(email) => ExpertFilter::Email(email),
        None => {
            let page = Page::new(query.page, query.limit).map_err(BookingError::Validation)?;
            ExpertFilter::Page(page)
        }
    };
    let usecase = GetExpertsUseCase { filter };

    execute(usecase, &ctx)
        .await
        .map(|experts| {
            HttpResponse::Ok().json(get_experts::APIResponse::from_experts(experts))
        })
        .map_err(BookingError::from)
}

pub async fn get_experts_by_expertise_controller(
    path: web::Path<get_experts_by_expertise::PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let usecase = GetExpertsUseCase {
        filter: ExpertFilter::Expertise(path.into_inner().expertise),
    };

    execute(usecase, &ctx)
        .await
        .map(|experts| {
            HttpResponse::Ok().json(get_experts_by_expertise::APIResponse::from_experts(experts))
        })
        .map_err(BookingError::from)
}

#[derive(Debug)]
enum ExpertFilter {
    Page(Page),
    Email(String),
    Expertise(String),
}

#[derive(Debug)]
struct GetExpertsUseCase {
    pub filter: ExpertFilter,
}

#[derive(Debug)]
enum UseCaseError {
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetExpertsUseCase {
    type Response = Vec<Expert>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetExperts";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let experts = match &self.filter {
            ExpertFilter::Page(page) => {
                bounded(ctx, ctx.repos.experts.find_many(page.skip(), page.limit)).await
            }
            ExpertFilter::Email(email) => {
                bounded(ctx, ctx.repos.experts.find_by_email(&email.trim().to_lowercase()))
                    .await
                    .map(|expert| expert.into_iter().collect())
            }
            ExpertFilter::Expertise(expertise) => {
                bounded(ctx, ctx.repos.experts.find_by_expertise(expertise)).await
            }
        };
        experts.map_err(UseCaseError::Storage)
    }
}
