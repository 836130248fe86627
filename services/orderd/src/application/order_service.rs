//! 订单应用服务

use std::sync::Arc;

use orderd_auth_core::{Authorizer, RequestContext};
use orderd_errors::{AppError, AppResult};
use tracing::{error, info, instrument, warn};

use super::{OrderMetrics, Outcome};
use crate::domain::order::{NewOrder, Order, OrderRepository};

/// 订单服务
///
/// 每个操作先授权，再校验，最后访问存储；前一步失败则不会进入后一步。
/// 存储调用受请求截止时间约束。
pub struct OrderService<R>
where
    R: OrderRepository,
{
    authorizer: Authorizer,
    repo: Arc<R>,
    metrics: Arc<dyn OrderMetrics>,
}

impl<R> OrderService<R>
where
    R: OrderRepository,
{
    pub fn new(authorizer: Authorizer, repo: Arc<R>, metrics: Arc<dyn OrderMetrics>) -> Self {
        Self {
            authorizer,
            repo,
            metrics,
        }
    }

    /// 为调用方创建订单
    #[instrument(name = "create_order", skip_all, fields(trace_id = ctx.trace_id().unwrap_or("unknown")))]
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        product: String,
        quantity: i32,
    ) -> AppResult<Order> {
        let user_id = self.authorizer.authorize(ctx).await?;

        let new_order = NewOrder::new(user_id, product, quantity)?;

        match ctx.run("create order", self.repo.create_order(new_order)).await {
            Ok(order) => {
                self.metrics.order_created(Outcome::Success);
                info!(
                    order_id = %order.id,
                    user_id = %order.user_id,
                    product = %order.product,
                    quantity = order.quantity,
                    "Order created"
                );
                Ok(order)
            }
            Err(e) => {
                self.metrics.order_created(Outcome::Failed);
                error!(error = %e, "Failed to create order");
                Err(e)
            }
        }
    }

    /// 查询调用方自己的订单
    #[instrument(name = "get_order", skip_all, fields(order_id = %order_id, trace_id = ctx.trace_id().unwrap_or("unknown")))]
    pub async fn get_order(&self, ctx: &RequestContext, order_id: &str) -> AppResult<Order> {
        let user_id = self.authorizer.authorize(ctx).await?;

        if order_id.is_empty() {
            return Err(AppError::validation("order id is required"));
        }

        let order = match ctx.run("get order", self.repo.get_order_by_id(order_id)).await {
            Ok(order) => order,
            Err(e) => {
                self.metrics.order_fetched(Outcome::Failed, None);
                warn!(error = %e, "Failed to fetch order");
                return Err(e);
            }
        };

        if !order.is_owned_by(&user_id) {
            self.metrics.order_fetched(Outcome::Failed, Some(&order.id));
            warn!(
                user_id = %user_id,
                owner_id = %order.user_id,
                "Caller does not own the order"
            );
            return Err(AppError::forbidden("unauthorized"));
        }

        self.metrics.order_fetched(Outcome::Success, Some(&order.id));
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use orderd_auth_core::{AUTHORIZATION_HEADER, Identity, IdentityResolver};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tonic::metadata::MetadataMap;

    use crate::infrastructure::metrics::InMemoryOrderMetrics;
    use crate::infrastructure::persistence::InMemoryOrderRepository;

    // ========== Mock 实现 ==========

    /// token -> user id 的静态映射
    struct MockIdentityResolver {
        users: HashMap<String, String>,
    }

    impl MockIdentityResolver {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                users: pairs
                    .iter()
                    .map(|(t, u)| (t.to_string(), u.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl IdentityResolver for MockIdentityResolver {
        async fn resolve_identity(
            &self,
            credential: &str,
            _ctx: &RequestContext,
        ) -> AppResult<Identity> {
            self.users
                .get(credential)
                .map(Identity::new)
                .ok_or_else(|| AppError::Grpc(tonic::Status::unauthenticated("invalid token")))
        }
    }

    /// 记录调用次数，可配置为失败或变慢
    struct MockOrderRepository {
        inner: InMemoryOrderRepository,
        fail_with: Mutex<Option<AppError>>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl MockOrderRepository {
        fn new() -> Self {
            Self {
                inner: InMemoryOrderRepository::new(),
                fail_with: Mutex::new(None),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(err: AppError) -> Self {
            let repo = Self::new();
            *repo.fail_with.lock().unwrap() = Some(err);
            repo
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn before_call(&self) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.fail_with.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl OrderRepository for MockOrderRepository {
        async fn create_order(&self, order: NewOrder) -> AppResult<Order> {
            self.before_call().await?;
            self.inner.create_order(order).await
        }

        async fn get_order_by_id(&self, id: &str) -> AppResult<Order> {
            self.before_call().await?;
            self.inner.get_order_by_id(id).await
        }
    }

    fn ctx_with_token(token: &str) -> RequestContext {
        let mut metadata = MetadataMap::new();
        metadata.insert(AUTHORIZATION_HEADER, token.parse().unwrap());
        RequestContext::new(metadata)
    }

    fn setup(
        repo: MockOrderRepository,
    ) -> (
        OrderService<MockOrderRepository>,
        Arc<MockOrderRepository>,
        Arc<InMemoryOrderMetrics>,
    ) {
        let resolver = Arc::new(MockIdentityResolver::new(&[
            ("Bearer t1", "u1"),
            ("Bearer t2", "u2"),
        ]));
        let repo = Arc::new(repo);
        let metrics = Arc::new(InMemoryOrderMetrics::new());
        let service = OrderService::new(Authorizer::new(resolver), repo.clone(), metrics.clone());
        (service, repo, metrics)
    }

    // ========== CreateOrder ==========

    #[tokio::test]
    async fn test_create_order_success() {
        let (service, repo, metrics) = setup(MockOrderRepository::new());

        let order = service
            .create_order(&ctx_with_token("Bearer t1"), "book".to_string(), 2)
            .await
            .unwrap();

        assert!(!order.id.is_empty());
        assert_eq!(order.user_id, "u1");
        assert_eq!(order.product, "book");
        assert_eq!(order.quantity, 2);
        assert_eq!(order.unit_price, 10.5);
        assert_eq!(repo.calls(), 1);
        assert_eq!(metrics.created(Outcome::Success), 1);
        assert_eq!(metrics.created(Outcome::Failed), 0);
    }

    #[tokio::test]
    async fn test_create_order_validation_skips_storage() {
        let (service, repo, metrics) = setup(MockOrderRepository::new());
        let ctx = ctx_with_token("Bearer t1");

        let err = service
            .create_order(&ctx, String::new(), 1)
            .await
            .unwrap_err();
        assert_eq!(err.grpc_code(), tonic::Code::InvalidArgument);
        assert_eq!(err.message(), "product is required");

        let err = service
            .create_order(&ctx, "book".to_string(), 0)
            .await
            .unwrap_err();
        assert_eq!(err.grpc_code(), tonic::Code::InvalidArgument);
        assert_eq!(err.message(), "quantity should be greater than 0");

        assert_eq!(repo.calls(), 0);
        assert_eq!(metrics.created(Outcome::Success), 0);
        assert_eq!(metrics.created(Outcome::Failed), 0);
    }

    #[tokio::test]
    async fn test_create_order_auth_checked_before_validation() {
        let (service, repo, _) = setup(MockOrderRepository::new());

        let err = service
            .create_order(&RequestContext::new(MetadataMap::new()), String::new(), 0)
            .await
            .unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::Unauthenticated);
        assert_eq!(err.message(), "missing authorization token");
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_order_storage_failure_counted() {
        let (service, _, metrics) =
            setup(MockOrderRepository::failing(AppError::database("connection reset")));

        let err = service
            .create_order(&ctx_with_token("Bearer t1"), "book".to_string(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::Internal);
        assert_eq!(metrics.created(Outcome::Failed), 1);
        assert_eq!(metrics.created(Outcome::Success), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_order_deadline_exceeded_in_storage() {
        let (service, _, metrics) = setup(MockOrderRepository::slow(Duration::from_secs(5)));
        let ctx = ctx_with_token("Bearer t1").with_timeout(Duration::from_millis(100));

        let err = service
            .create_order(&ctx, "book".to_string(), 1)
            .await
            .unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::DeadlineExceeded);
        assert_eq!(metrics.created(Outcome::Failed), 1);
    }

    // ========== GetOrder ==========

    #[tokio::test]
    async fn test_get_order_by_owner() {
        let (service, _, metrics) = setup(MockOrderRepository::new());
        let ctx = ctx_with_token("Bearer t1");

        let created = service
            .create_order(&ctx, "pen".to_string(), 1)
            .await
            .unwrap();
        let fetched = service.get_order(&ctx, &created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(metrics.fetched_for(Outcome::Success, &created.id), 1);
    }

    #[tokio::test]
    async fn test_get_order_of_other_user_denied() {
        let (service, _, metrics) = setup(MockOrderRepository::new());

        let created = service
            .create_order(&ctx_with_token("Bearer t1"), "pen".to_string(), 1)
            .await
            .unwrap();
        let err = service
            .get_order(&ctx_with_token("Bearer t2"), &created.id)
            .await
            .unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::PermissionDenied);
        assert_eq!(err.message(), "unauthorized");
        assert_eq!(metrics.fetched_for(Outcome::Failed, &created.id), 1);
        assert_eq!(metrics.fetched(Outcome::Success), 0);
    }

    #[tokio::test]
    async fn test_get_order_empty_id_skips_storage() {
        let (service, repo, metrics) = setup(MockOrderRepository::new());

        let err = service
            .get_order(&ctx_with_token("Bearer t1"), "")
            .await
            .unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::InvalidArgument);
        assert_eq!(err.message(), "order id is required");
        assert_eq!(repo.calls(), 0);
        assert_eq!(metrics.fetched(Outcome::Failed), 0);
    }

    #[tokio::test]
    async fn test_get_order_not_found_passes_through() {
        let (service, _, metrics) = setup(MockOrderRepository::new());

        let err = service
            .get_order(&ctx_with_token("Bearer t1"), "missing")
            .await
            .unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::NotFound);
        assert_eq!(metrics.fetched(Outcome::Failed), 1);
        assert_eq!(metrics.fetched_for(Outcome::Failed, "missing"), 0);
        assert_eq!(metrics.labelled_order_ids(), 0);
    }

    #[tokio::test]
    async fn test_get_order_storage_failure_passes_through() {
        let (service, repo, metrics) =
            setup(MockOrderRepository::failing(AppError::database("connection reset")));

        let err = service
            .get_order(&ctx_with_token("Bearer t1"), "o-1")
            .await
            .unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::Internal);
        assert_eq!(err.message(), "connection reset");
        assert_eq!(repo.calls(), 1);
        assert_eq!(metrics.fetched(Outcome::Failed), 1);
        assert_eq!(metrics.fetched_for(Outcome::Failed, "o-1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_order_deadline_exceeded_in_storage() {
        let (service, _, metrics) = setup(MockOrderRepository::slow(Duration::from_secs(5)));
        let ctx = ctx_with_token("Bearer t1").with_timeout(Duration::from_millis(100));

        let err = service.get_order(&ctx, "o-1").await.unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::DeadlineExceeded);
        assert_eq!(metrics.fetched(Outcome::Failed), 1);
        assert_eq!(metrics.fetched(Outcome::Success), 0);
    }

    #[tokio::test]
    async fn test_unknown_ids_do_not_create_labelled_counters() {
        let (service, _, metrics) = setup(MockOrderRepository::new());
        let ctx = ctx_with_token("Bearer t1");

        for i in 0..100 {
            let err = service
                .get_order(&ctx, &format!("junk-{}", i))
                .await
                .unwrap_err();
            assert_eq!(err.grpc_code(), tonic::Code::NotFound);
        }

        assert_eq!(metrics.fetched(Outcome::Failed), 100);
        assert_eq!(metrics.labelled_order_ids(), 0);
    }

    #[tokio::test]
    async fn test_get_order_unauthenticated_skips_storage() {
        let (service, repo, metrics) = setup(MockOrderRepository::new());

        let err = service
            .get_order(&ctx_with_token("Bearer nope"), "o-1")
            .await
            .unwrap_err();

        assert_eq!(err.grpc_code(), tonic::Code::Unauthenticated);
        assert_eq!(err.message(), "invalid token");
        assert_eq!(repo.calls(), 0);
        assert_eq!(metrics.fetched(Outcome::Failed), 0);
    }
}
