pub mod asset;
pub mod auth;
pub mod category;
pub mod dashboard;
pub mod lifecycle;
pub mod location;
pub mod transaction;
pub mod user;

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition, DbErr, SqlErr};

use crate::error::AppError;

/// Case-insensitive match of `pattern` (see [`like_pattern`]) against any of
/// `columns`.
///
/// [`like_pattern`]: crate::models::shared::like_pattern
pub(crate) fn search_any<C: ColumnTrait>(
    columns: impl IntoIterator<Item = C>,
    pattern: &str,
) -> Condition {
    columns.into_iter().fold(Condition::any(), |cond, col| {
        cond.add(
            Expr::expr(Func::lower(Expr::col(col)))
                .like(LikeExpr::new(pattern).escape('\\')),
        )
    })
}

/// Map a unique-constraint violation to `409 CONFLICT` with `message`.
pub(crate) fn conflict_on_unique(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.into()),
        _ => AppError::from(err),
    }
}
