/*!
 * 速率限制中间件
 *
 * 固定窗口计数：每个限制键在窗口内最多放行 `max_requests` 次，窗口到期后重新计数。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::rate_limit::RateLimit;
 *
 * App::new()
 *     .service(
 *         web::resource("/api/v1/auth/login")
 *             .wrap(RateLimit::login())
 *             .route(web::post().to(login_handler))
 *     )
 * ```
 *
 * ## 限制键
 *
 * - 位于 RequireJWT 之后的路由按用户 ID 计数（审查接口）
 * - 匿名路由按客户端地址计数（登录、注册）
 * - 超过限制返回 429，并带 `Retry-After`
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

/// 所有限制器共享的计数桶，空闲一小时后回收
static BUCKETS: Lazy<Cache<String, Bucket>> = Lazy::new(|| {
    Cache::builder()
        .time_to_idle(Duration::from_secs(3600))
        .max_capacity(100_000)
        .build()
});

#[derive(Debug, Clone, Copy)]
struct Bucket {
    opened_at: Instant,
    count: u32,
}

/// 判断一次请求能否放行
///
/// 放行时返回更新后的桶，拒绝时返回距离窗口结束的秒数。
fn admit(
    bucket: Option<Bucket>,
    now: Instant,
    max_requests: u32,
    window: Duration,
) -> Result<Bucket, u64> {
    let bucket = match bucket {
        Some(b) if now.duration_since(b.opened_at) < window => b,
        _ => Bucket {
            opened_at: now,
            count: 0,
        },
    };

    if bucket.count >= max_requests {
        let left = window.saturating_sub(now.duration_since(bucket.opened_at));
        return Err(left.as_secs().max(1));
    }

    Ok(Bucket {
        count: bucket.count + 1,
        ..bucket
    })
}

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window: Duration,
    scope: &'static str,
}

impl RateLimit {
    pub fn new(scope: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window: Duration::from_secs(window_secs.max(1)),
            scope,
        }
    }

    /// 登录：按客户端地址，每分钟 `server.limits.login_per_minute` 次
    pub fn login() -> Self {
        let limits = &AppConfig::get().server.limits;
        Self::new("login", limits.login_per_minute, 60)
    }

    /// 注册：按客户端地址，每分钟 `server.limits.register_per_minute` 次
    pub fn register() -> Self {
        let limits = &AppConfig::get().server.limits;
        Self::new("register", limits.register_per_minute, 60)
    }

    /// 审查：按用户，每分钟 `server.limits.review_per_minute` 次
    ///
    /// 每次审查都会访问代码托管平台和生成式文本服务。
    pub fn review() -> Self {
        let limits = &AppConfig::get().server.limits;
        Self::new("review", limits.review_per_minute, 60)
    }
}

fn limit_key(scope: &str, req: &ServiceRequest) -> String {
    if let Some(user_id) = req.extensions().get::<User>().map(|u| u.id) {
        return format!("{scope}:user:{user_id}");
    }
    // realip_remote_addr 已经考虑了 Forwarded / X-Forwarded-For
    let addr = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!("{scope}:addr:{addr}")
}

fn too_many_requests(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "请求过于频繁，请稍后再试",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            let key = limit_key(limit.scope, &req);
            let current = BUCKETS.get(&key).await;

            match admit(current, Instant::now(), limit.max_requests, limit.window) {
                Ok(bucket) => {
                    BUCKETS.insert(key, bucket).await;
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(retry_after) => {
                    warn!(
                        "Rate limit exceeded for {} ({} per {:?})",
                        key, limit.max_requests, limit.window
                    );
                    Ok(req.into_response(too_many_requests(retry_after).map_into_right_body()))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_counts_within_window() {
        let window = Duration::from_secs(60);
        let start = Instant::now();

        let first = admit(None, start, 2, window).unwrap();
        assert_eq!(first.count, 1);
        let second = admit(Some(first), start + Duration::from_secs(1), 2, window).unwrap();
        assert_eq!(second.count, 2);

        let retry = admit(Some(second), start + Duration::from_secs(20), 2, window).unwrap_err();
        assert_eq!(retry, 40);
    }

    #[test]
    fn test_admit_resets_after_window() {
        let window = Duration::from_secs(60);
        let start = Instant::now();
        let full = Bucket {
            opened_at: start,
            count: 5,
        };

        let fresh = admit(Some(full), start + Duration::from_secs(61), 5, window).unwrap();
        assert_eq!(fresh.count, 1);
        assert_eq!(fresh.opened_at, start + Duration::from_secs(61));
    }

    #[test]
    fn test_limits_never_zero() {
        let limit = RateLimit::new("x", 0, 0);
        assert_eq!(limit.max_requests, 1);
        assert_eq!(limit.window, Duration::from_secs(1));
    }
}
