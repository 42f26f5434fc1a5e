//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod stream_bindings;
mod player_bindings;

/// Python module definition
#[pymodule]
fn fft_stream(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<stream_bindings::PyFftAudioStream>()?;
    m.add_class::<player_bindings::PyStreamPlayer>()?;

    m.add("DEFAULT_BLOCK_SIZE", crate::stream::config::DEFAULT_BLOCK_SIZE)?;

    Ok(())
}

/// Map any library error to a Python RuntimeError
pub(crate) fn runtime_error(e: impl std::fmt::Display) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
}
