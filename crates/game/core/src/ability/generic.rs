//! Generic executor for abilities without a registered handler.
//!
//! Resolves the catalogue shape, then applies damage, heal, shield and
//! effects to every target in ascending id order.

use crate::catalogue::Shape;

use super::common::{apply_payload, resolve_area, validate_point, validate_target};
use super::{CastContext, ExecutionResult, FailureReason, Validation};

pub fn validate(ctx: &CastContext<'_>) -> Validation {
    let target = validate_target(ctx);
    if !target.valid {
        return target;
    }
    // Point abilities aim at entities; a bare location is not a target.
    if matches!(ctx.definition.shape, Shape::Point)
        && ctx.params.target_point.is_some()
        && ctx.params.target_entity.is_none()
    {
        return Validation::fail(FailureReason::InvalidTarget);
    }
    validate_point(ctx)
}

pub fn execute(ctx: &mut CastContext<'_>) -> ExecutionResult {
    let Some(targets) = resolve_area(ctx) else {
        return ExecutionResult::failed();
    };
    if matches!(ctx.definition.shape, Shape::Point) && targets.is_empty() {
        return ExecutionResult::failed();
    }
    apply_payload(ctx, &targets, 1.0);
    ExecutionResult::success()
}
