use crate::domain::PaymentResult;

/// Lifecycle transitions: `Created -> Paid -> Delivered`.
///
/// Neither transition is guarded against repetition: paying twice
/// overwrites the payment snapshot and timestamp.
#[derive(Debug, Clone)]
pub enum OrderAction {
    MarkPaid(PaymentResult),
    MarkDelivered,
}
