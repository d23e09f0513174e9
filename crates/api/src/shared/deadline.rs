use consultation_booking_infra::BookingContext;
use std::future::Future;

/// Bounds a storage call by the configured operation timeout. An elapsed
/// deadline is reported like any other storage failure.
pub async fn bounded<T, F>(ctx: &BookingContext, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(ctx.config.operation_timeout, fut).await {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!(
            "Storage operation timed out after {:?}",
            ctx.config.operation_timeout
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[actix_web::test]
    async fn times_out_slow_operations() {
        let mut ctx = BookingContext::create_inmemory();
        ctx.config.operation_timeout = Duration::from_millis(10);

        let res = bounded(&ctx, async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;
        assert!(res.is_err());

        let res = bounded(&ctx, async { Ok(5) }).await;
        assert_eq!(res.unwrap(), 5);
    }
}
