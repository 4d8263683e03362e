// self
use crate::{obs::DispatchEvent, request::Method};

/// Records a dispatch event via the global metrics recorder (when enabled).
pub fn record_dispatch(method: Method, event: DispatchEvent) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"request_broker_dispatch_total",
			"method" => method.label(),
			"outcome" => event.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (method, event);
	}
}

/// Publishes the number of requests currently driving the progress indicator.
pub fn record_in_flight(count: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::gauge!("request_broker_in_flight").set(count as f64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = count;
	}
}
