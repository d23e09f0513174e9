use super::non_blank;
use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::update_expert::*;
use consultation_booking_domain::{Actor, Expert, ExpertStatus, ID};
use consultation_booking_infra::BookingContext;

pub async fn update_expert_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let body = body.0;
    let usecase = UpdateExpertUseCase {
        actor,
        expert_id: path.expert_id.clone(),
        name: body.name,
        email: body.email,
        expertise: body.expertise,
        status: body.status,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|expert| HttpResponse::Ok().json(APIResponse::from_expert(expert)))
        .map_err(BookingError::from)
}

/// Admins may update any expert, experts only themselves
#[derive(Debug)]
struct UpdateExpertUseCase {
    pub actor: Actor,
    pub expert_id: ID,
    pub name: Option<String>,
    pub email: Option<String>,
    pub expertise: Option<String>,
    pub status: Option<ExpertStatus>,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    NotOwner,
    MissingField(&'static str),
    EmailTaken(String),
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The expert with id: {}, was not found.", id))
            }
            UseCaseError::NotOwner => {
                Self::Forbidden("Experts can only update their own profile.".into())
            }
            UseCaseError::MissingField(field) => {
                Self::Validation(format!("The {} of the expert can not be empty.", field))
            }
            UseCaseError::EmailTaken(email) => Self::Conflict(format!(
                "An expert with the email: {}, already exists.",
                email
            )),
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

fn replacement(
    value: &Option<String>,
    field: &'static str,
) -> Result<Option<String>, UseCaseError> {
    match value {
        Some(value) => non_blank(value)
            .map(Some)
            .ok_or(UseCaseError::MissingField(field)),
        None => Ok(None),
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateExpertUseCase {
    type Response = Expert;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateExpert";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        if !self.actor.acts_for_expert(&self.expert_id) {
            return Err(UseCaseError::NotOwner);
        }

        let mut expert = bounded(ctx, ctx.repos.experts.find(&self.expert_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.expert_id.clone()))?;

        if let Some(name) = replacement(&self.name, "name")? {
            expert.name = name;
        }
        if let Some(expertise) = replacement(&self.expertise, "expertise")? {
            expert.expertise = expertise;
        }
        if let Some(email) = replacement(&self.email, "email")? {
            let email = email.to_lowercase();
            if email != expert.email {
                let taken = bounded(ctx, ctx.repos.experts.find_by_email(&email))
                    .await
                    .map_err(UseCaseError::Storage)?;
                if taken.is_some() {
                    return Err(UseCaseError::EmailTaken(email));
                }
                expert.email = email;
            }
        }
        let status_changed = match self.status {
            Some(status) if status != expert.status => {
                expert.status = status;
                true
            }
            _ => false,
        };
        expert.updated = ctx.sys.now();

        bounded(ctx, ctx.repos.experts.save(&expert))
            .await
            .map_err(UseCaseError::Storage)?;
        if status_changed {
            ctx.cache.invalidate_expert(&expert.id).await;
        }

        Ok(expert)
    }
}

impl PermissionBoundary for UpdateExpertUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::UpdateExpert]
    }
}
