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
use consultation_booking_api_structs::create_expert::*;
use consultation_booking_domain::Expert;
use consultation_booking_infra::BookingContext;

pub async fn create_expert_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (_, policy) = protect_route(&http_req)?;

    let body = body.0;
    let usecase = CreateExpertUseCase {
        name: body.name,
        email: body.email,
        expertise: body.expertise,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|expert| HttpResponse::Created().json(APIResponse::from_expert(expert)))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct CreateExpertUseCase {
    pub name: String,
    pub email: String,
    pub expertise: String,
}

#[derive(Debug)]
enum UseCaseError {
    MissingField(&'static str),
    EmailTaken(String),
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
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

#[async_trait::async_trait(?Send)]
impl UseCase for CreateExpertUseCase {
    type Response = Expert;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateExpert";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let name = non_blank(&self.name).ok_or(UseCaseError::MissingField("name"))?;
        let email = non_blank(&self.email)
            .ok_or(UseCaseError::MissingField("email"))?
            .to_lowercase();
        let expertise =
            non_blank(&self.expertise).ok_or(UseCaseError::MissingField("expertise"))?;

        let existing = bounded(ctx, ctx.repos.experts.find_by_email(&email))
            .await
            .map_err(UseCaseError::Storage)?;
        if existing.is_some() {
            return Err(UseCaseError::EmailTaken(email));
        }

        let expert = Expert::new(name, email, expertise, ctx.sys.now());
        bounded(ctx, ctx.repos.experts.insert(&expert))
            .await
            .map_err(UseCaseError::Storage)?;

        Ok(expert)
    }
}

impl PermissionBoundary for CreateExpertUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::CreateExpert]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::setup;

    fn usecase(email: &str) -> CreateExpertUseCase {
        CreateExpertUseCase {
            name: " Ada Lovelace ".into(),
            email: email.into(),
            expertise: "tax".into(),
        }
    }

    #[actix_web::test]
    async fn creates_active_experts_with_unique_emails() {
        let (ctx, _) = setup();

        let expert = usecase("Ada@Example.com").execute(&ctx).await.unwrap();
        assert_eq!(expert.name, "Ada Lovelace");
        assert_eq!(expert.email, "ada@example.com");
        assert!(expert.is_bookable());

        let res = usecase("ada@example.com").execute(&ctx).await;
        assert!(matches!(res, Err(UseCaseError::EmailTaken(_))));
    }

    #[actix_web::test]
    async fn rejects_blank_fields() {
        let (ctx, _) = setup();
        let mut blank = usecase("ada@example.com");
        blank.expertise = "  ".into();
        assert!(matches!(
            blank.execute(&ctx).await,
            Err(UseCaseError::MissingField("expertise"))
        ));
    }
}
