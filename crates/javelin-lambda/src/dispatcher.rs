use thiserror::Error;
use tracing::debug;

/// Name of the synthetic per-class deserialization method.
pub const DESERIALIZE_METHOD_NAME: &str = "$deserializeLambda$";

/// One lambda the dispatcher can reconstitute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchCase {
    pub impl_method_name: String,
    pub impl_method_signature: String,
    /// Internal name of the functional interface.
    pub sam_interface: String,
    pub sam_method_name: String,
    pub sam_method_signature: String,
    /// Captured-argument slot 0 holds the enclosing instance.
    pub captures_this: bool,
    /// Number of captured variables, excluding the receiver.
    pub capture_count: usize,
}

/// The `$deserializeLambda$` dispatcher of one class: disambiguates among
/// every serializable lambda declared in that class (including lambdas
/// nested in other lambda bodies) by implementation method and functional
/// interface metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeserializeDispatcher {
    class_internal_name: String,
    cases: Vec<DispatchCase>,
}

/// A captured value carried by a serialized lambda.
#[derive(Clone, Debug, PartialEq)]
pub enum CapturedValue {
    Int(i64),
    Str(String),
    /// An arbitrary object reference, identified for test purposes.
    Ref(String),
}

/// The `SerializedLambda`-shaped record read back during deserialization.
#[derive(Clone, Debug, PartialEq)]
pub struct SerializedLambdaRecord {
    pub capturing_class: String,
    pub functional_interface_class: String,
    pub functional_interface_method_name: String,
    pub functional_interface_method_signature: String,
    pub impl_method_name: String,
    pub impl_method_signature: String,
    /// For a `this`-capturing lambda the receiver is at index 0 and the
    /// captured variables follow; otherwise the variables start at index 0.
    pub captured_args: Vec<CapturedValue>,
}

/// A reconstituted callable: the implementation method to invoke plus the
/// receiver and captured arguments to invoke it with.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructedLambda {
    pub impl_method_name: String,
    pub receiver: Option<CapturedValue>,
    pub captured: Vec<CapturedValue>,
}

/// Deserialization failure: fatal to the single read, not to the process.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeserializationError {
    #[error("Invalid lambda deserialization")]
    InvalidLambdaDeserialization,
}

impl DeserializeDispatcher {
    pub fn new(class_internal_name: impl Into<String>) -> Self {
        Self {
            class_internal_name: class_internal_name.into(),
            cases: Vec::new(),
        }
    }

    pub fn class_internal_name(&self) -> &str {
        &self.class_internal_name
    }

    pub fn method_name(&self) -> &'static str {
        DESERIALIZE_METHOD_NAME
    }

    pub fn cases(&self) -> &[DispatchCase] {
        &self.cases
    }

    pub fn add_case(&mut self, case: DispatchCase) {
        debug!(impl_method = %case.impl_method_name, "dispatcher case added");
        self.cases.push(case);
    }

    /// Match `record` against the known cases and extract the captured
    /// state.
    ///
    /// Captured variables are read starting at index 1 when the lambda also
    /// captures `this` (the receiver sits at index 0), and at index 0
    /// otherwise. Metadata that matches no known implementation method
    /// fails the read with [`DeserializationError::InvalidLambdaDeserialization`].
    pub fn deserialize(
        &self,
        record: &SerializedLambdaRecord,
    ) -> Result<ReconstructedLambda, DeserializationError> {
        if record.capturing_class != self.class_internal_name {
            return Err(DeserializationError::InvalidLambdaDeserialization);
        }

        let case = self
            .cases
            .iter()
            .find(|case| {
                case.impl_method_name == record.impl_method_name
                    && case.impl_method_signature == record.impl_method_signature
                    && case.sam_interface == record.functional_interface_class
                    && case.sam_method_name == record.functional_interface_method_name
                    && case.sam_method_signature == record.functional_interface_method_signature
            })
            .ok_or(DeserializationError::InvalidLambdaDeserialization)?;

        let first_capture = if case.captures_this { 1 } else { 0 };
        if record.captured_args.len() != first_capture + case.capture_count {
            return Err(DeserializationError::InvalidLambdaDeserialization);
        }

        let receiver = if case.captures_this {
            Some(record.captured_args[0].clone())
        } else {
            None
        };
        let captured = record.captured_args[first_capture..].to_vec();

        Ok(ReconstructedLambda {
            impl_method_name: case.impl_method_name.clone(),
            receiver,
            captured,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn case(name: &str, captures_this: bool, capture_count: usize) -> DispatchCase {
        DispatchCase {
            impl_method_name: name.to_string(),
            impl_method_signature: "()V".to_string(),
            sam_interface: "java/lang/Runnable".to_string(),
            sam_method_name: "run".to_string(),
            sam_method_signature: "()V".to_string(),
            captures_this,
            capture_count,
        }
    }

    fn record(name: &str, args: Vec<CapturedValue>) -> SerializedLambdaRecord {
        SerializedLambdaRecord {
            capturing_class: "Foo".to_string(),
            functional_interface_class: "java/lang/Runnable".to_string(),
            functional_interface_method_name: "run".to_string(),
            functional_interface_method_signature: "()V".to_string(),
            impl_method_name: name.to_string(),
            impl_method_signature: "()V".to_string(),
            captured_args: args,
        }
    }

    #[test]
    fn plain_lambda_reads_captures_from_index_zero() {
        let mut dispatcher = DeserializeDispatcher::new("Foo");
        dispatcher.add_case(case("lambda$0", false, 1));

        let reconstructed = dispatcher
            .deserialize(&record("lambda$0", vec![CapturedValue::Int(7)]))
            .unwrap();
        assert_eq!(reconstructed.receiver, None);
        assert_eq!(reconstructed.captured, vec![CapturedValue::Int(7)]);
    }

    #[test]
    fn this_capturing_lambda_reads_captures_from_index_one() {
        let mut dispatcher = DeserializeDispatcher::new("Foo");
        dispatcher.add_case(case("lambda$0", true, 1));

        let reconstructed = dispatcher
            .deserialize(&record(
                "lambda$0",
                vec![
                    CapturedValue::Ref("this".to_string()),
                    CapturedValue::Int(42),
                ],
            ))
            .unwrap();
        assert_eq!(
            reconstructed.receiver,
            Some(CapturedValue::Ref("this".to_string()))
        );
        assert_eq!(reconstructed.captured, vec![CapturedValue::Int(42)]);
    }

    #[test]
    fn unknown_metadata_fails_the_single_read() {
        let mut dispatcher = DeserializeDispatcher::new("Foo");
        dispatcher.add_case(case("lambda$0", false, 0));

        assert_eq!(
            dispatcher.deserialize(&record("lambda$9", vec![])),
            Err(DeserializationError::InvalidLambdaDeserialization)
        );
        // The dispatcher itself is untouched and keeps serving good reads.
        assert!(dispatcher.deserialize(&record("lambda$0", vec![])).is_ok());
    }

    #[test]
    fn capture_arity_mismatch_is_invalid() {
        let mut dispatcher = DeserializeDispatcher::new("Foo");
        dispatcher.add_case(case("lambda$0", true, 1));

        // Receiver missing: only the captured variable is present.
        assert_eq!(
            dispatcher.deserialize(&record("lambda$0", vec![CapturedValue::Int(42)])),
            Err(DeserializationError::InvalidLambdaDeserialization)
        );
    }

    #[test]
    fn wrong_capturing_class_is_invalid() {
        let mut dispatcher = DeserializeDispatcher::new("Bar");
        dispatcher.add_case(case("lambda$0", false, 0));
        assert_eq!(
            dispatcher.deserialize(&record("lambda$0", vec![])),
            Err(DeserializationError::InvalidLambdaDeserialization)
        );
    }
}
