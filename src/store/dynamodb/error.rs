//! Maps AWS SDK errors to `GraphError`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::CancellationReason;

use crate::error::GraphError;

/// Unwrap the modeled service error, or map transport-level failures.
fn service_error<E: Debug, R: Debug>(
    err: SdkError<E, R>,
    operation: &'static str,
) -> Result<E, GraphError> {
    match err {
        SdkError::ServiceError(context) => Ok(context.into_err()),
        SdkError::TimeoutError(_) => Err(GraphError::Timeout { operation }),
        other => Err(GraphError::StorageUnavailable(format!(
            "{operation} failed: {other:?}"
        ))),
    }
}

fn throttled() -> GraphError {
    GraphError::StorageUnavailable("Throughput exceeded, please retry".to_string())
}

fn table_not_found() -> GraphError {
    GraphError::StorageUnavailable("Table not found".to_string())
}

/// Map a GetItem SDK error to GraphError.
pub fn map_get_item_error<R: Debug>(err: SdkError<GetItemError, R>) -> GraphError {
    match service_error(err, "GetItem") {
        Ok(GetItemError::ResourceNotFoundException(_)) => table_not_found(),
        Ok(GetItemError::ProvisionedThroughputExceededException(_))
        | Ok(GetItemError::RequestLimitExceeded(_)) => throttled(),
        Ok(err) => GraphError::StorageUnavailable(format!("GetItem failed: {err:?}")),
        Err(err) => err,
    }
}

/// Map a PutItem SDK error to GraphError.
pub fn map_put_item_error<R: Debug>(err: SdkError<PutItemError, R>) -> GraphError {
    match service_error(err, "PutItem") {
        Ok(PutItemError::ConditionalCheckFailedException(_)) => {
            GraphError::ConditionalWriteFailed {
                failed_ops: vec![0],
            }
        }
        Ok(PutItemError::ResourceNotFoundException(_)) => table_not_found(),
        Ok(PutItemError::ProvisionedThroughputExceededException(_))
        | Ok(PutItemError::RequestLimitExceeded(_)) => throttled(),
        Ok(err) => GraphError::StorageUnavailable(format!("PutItem failed: {err:?}")),
        Err(err) => err,
    }
}

/// Map a Query SDK error to GraphError.
pub fn map_query_error<R: Debug>(err: SdkError<QueryError, R>) -> GraphError {
    match service_error(err, "Query") {
        Ok(QueryError::ResourceNotFoundException(_)) => table_not_found(),
        Ok(QueryError::ProvisionedThroughputExceededException(_))
        | Ok(QueryError::RequestLimitExceeded(_)) => throttled(),
        Ok(err) => GraphError::StorageUnavailable(format!("Query failed: {err:?}")),
        Err(err) => err,
    }
}

/// Map a TransactWriteItems SDK error to GraphError.
///
/// A cancelled transaction reports one reason per operation, in order;
/// `ConditionalCheckFailed` reasons become the failed operation indices.
/// A cancellation with no conditional failure among its reasons (throttling,
/// conflicts, validation) is a storage failure, not a conflict.
pub fn map_transact_write_error<R: Debug>(
    err: SdkError<TransactWriteItemsError, R>,
) -> GraphError {
    match service_error(err, "TransactWriteItems") {
        Ok(TransactWriteItemsError::TransactionCanceledException(e)) => {
            let reasons = e.cancellation_reasons();
            let failed_ops = conditional_failures(reasons);
            if failed_ops.is_empty() {
                let codes: Vec<&str> = reasons.iter().filter_map(|r| r.code()).collect();
                GraphError::StorageUnavailable(format!(
                    "Transaction cancelled: [{}]",
                    codes.join(", ")
                ))
            } else {
                GraphError::ConditionalWriteFailed { failed_ops }
            }
        }
        Ok(TransactWriteItemsError::TransactionInProgressException(_)) => {
            GraphError::StorageUnavailable("Transaction in progress, please retry".to_string())
        }
        Ok(TransactWriteItemsError::ResourceNotFoundException(_)) => table_not_found(),
        Ok(TransactWriteItemsError::ProvisionedThroughputExceededException(_))
        | Ok(TransactWriteItemsError::RequestLimitExceeded(_)) => throttled(),
        Ok(err) => {
            GraphError::StorageUnavailable(format!("TransactWriteItems failed: {err:?}"))
        }
        Err(err) => err,
    }
}

fn conditional_failures(reasons: &[CancellationReason]) -> Vec<usize> {
    reasons
        .iter()
        .enumerate()
        .filter(|(_, reason)| reason.code() == Some("ConditionalCheckFailed"))
        .map(|(index, _)| index)
        .collect()
}

/// Map a generic connection/config error to GraphError.
pub fn map_connection_error(err: impl Debug) -> GraphError {
    GraphError::StorageUnavailable(format!("{err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, TransactionCanceledException,
    };

    fn reason(code: &str) -> CancellationReason {
        CancellationReason::builder().code(code).build()
    }

    fn cancelled(codes: &[&str]) -> SdkError<TransactWriteItemsError, ()> {
        let exception = TransactionCanceledException::builder()
            .set_cancellation_reasons(Some(codes.iter().map(|code| reason(code)).collect()))
            .message("Transaction cancelled")
            .build();
        SdkError::service_error(
            TransactWriteItemsError::TransactionCanceledException(exception),
            (),
        )
    }

    #[test]
    fn test_put_condition_failure_is_op_zero() {
        let err = SdkError::service_error(
            PutItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder().build(),
            ),
            (),
        );
        assert_eq!(
            map_put_item_error(err),
            GraphError::ConditionalWriteFailed { failed_ops: vec![0] }
        );
    }

    #[test]
    fn test_cancellation_reasons_become_op_indices() {
        let err = map_transact_write_error(cancelled(&["None", "ConditionalCheckFailed"]));
        assert_eq!(err, GraphError::ConditionalWriteFailed { failed_ops: vec![1] });
        assert!(err.failed_at(1));
        assert!(!err.failed_at(0));

        let err = map_transact_write_error(cancelled(&[
            "ConditionalCheckFailed",
            "ConditionalCheckFailed",
        ]));
        assert_eq!(err, GraphError::ConditionalWriteFailed { failed_ops: vec![0, 1] });
    }

    #[test]
    fn test_throttled_cancellation_is_unavailable() {
        let err = map_transact_write_error(cancelled(&["None", "ThrottlingError"]));
        match err {
            GraphError::StorageUnavailable(message) => {
                assert!(message.contains("ThrottlingError"))
            }
            other => panic!("expected StorageUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_conflict_cancellation_is_unavailable() {
        let err = map_transact_write_error(cancelled(&["TransactionConflict", "None"]));
        assert_eq!(err.status_code(), 500);
        assert!(matches!(err, GraphError::StorageUnavailable(_)));
    }

    #[test]
    fn test_sdk_timeout_maps_to_timeout() {
        let err: SdkError<PutItemError, ()> = SdkError::timeout_error("deadline elapsed");
        assert_eq!(
            map_put_item_error(err),
            GraphError::Timeout {
                operation: "PutItem"
            }
        );

        let err: SdkError<TransactWriteItemsError, ()> =
            SdkError::timeout_error("deadline elapsed");
        assert_eq!(
            map_transact_write_error(err),
            GraphError::Timeout {
                operation: "TransactWriteItems"
            }
        );
    }

    #[test]
    fn test_conditional_failures_by_position() {
        let reasons = [reason("None"), reason("ConditionalCheckFailed")];
        assert_eq!(conditional_failures(&reasons), vec![1]);
    }

    #[test]
    fn test_no_failures() {
        assert!(conditional_failures(&[reason("None"), reason("None")]).is_empty());
    }
}
