//! The `io` namespace.
//!
//! Sinks cross the bridge as opaque values; the realm never looks inside
//! anything but an [`OutputBuffer`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::function_object::Arity;
use crate::runner::ds::value::{Value, ValueType};
use crate::runner::plugin::registry::NamespaceRegistry;
use crate::runner::plugin::types::NamespaceDef;

/// Type name carried by opaque buffer values.
pub const OUTPUT_BUFFER_TYPE: &str = "io/output-buffer";

/// In-memory byte sink shared between host and realm.
#[derive(Clone, Default)]
pub struct OutputBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        OutputBuffer::default()
    }

    /// An opaque value pointing at this buffer.
    pub fn to_value(&self) -> Value {
        Value::opaque(OUTPUT_BUFFER_TYPE, self.clone())
    }

    pub fn value_type() -> ValueType {
        ValueType::Opaque(OUTPUT_BUFFER_TYPE.to_string())
    }

    pub fn write(&self, data: &[u8]) {
        self.bytes.lock().extend_from_slice(data);
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Contents decoded as UTF-8, lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

/// Register the `io` namespace with the registry.
pub fn register(registry: &mut NamespaceRegistry) {
    let io = NamespaceDef::new("io")
        .add_fn("copy", Arity::Exact(2), io_copy)
        .add_fn("output-buffer", Arity::Exact(0), io_output_buffer)
        .add_fn("buffer-text", Arity::Exact(1), io_buffer_text);

    registry.register_namespace(io);
}

fn buffer_arg<'a>(function: &str, value: &'a Value) -> Result<&'a OutputBuffer> {
    let buffer = match value {
        Value::Opaque(o) => o.downcast_ref::<OutputBuffer>(),
        _ => None,
    };
    buffer.ok_or_else(|| {
        BridgeError::foreign(
            function,
            format!("expected {}, got {}", OUTPUT_BUFFER_TYPE, value.value_type()),
        )
    })
}

/// (copy input output) writes a string or byte array into a buffer.
fn io_copy(args: &[Value]) -> Result<Value> {
    let output = buffer_arg("io/copy", &args[1])?;
    match &args[0] {
        Value::String(s) => output.write(s.as_bytes()),
        Value::Bytes(b) => output.write(b),
        other => {
            return Err(BridgeError::foreign(
                "io/copy",
                format!("cannot copy from {}", other.value_type()),
            ))
        }
    }
    Ok(Value::Nil)
}

fn io_output_buffer(_args: &[Value]) -> Result<Value> {
    Ok(OutputBuffer::new().to_value())
}

fn io_buffer_text(args: &[Value]) -> Result<Value> {
    Ok(Value::String(buffer_arg("io/buffer-text", &args[0])?.contents()))
}
