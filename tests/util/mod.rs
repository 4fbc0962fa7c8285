use gcf_search::config::SearchConfig;
use gcf_search::numeric::Constant;
use gcf_search::series::CompactPolynomial;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Compact polynomial from nested slices.
#[allow(dead_code)]
pub fn poly(terms: &[&[i64]]) -> CompactPolynomial {
    CompactPolynomial::new(terms.iter().map(|t| t.to_vec()).collect())
}

/// A searchable config with progress output disabled.
#[allow(dead_code)]
pub fn search_config(
    constant: Constant,
    lhs_limit: i64,
    poly_a: CompactPolynomial,
    poly_b: CompactPolynomial,
) -> SearchConfig {
    SearchConfig {
        constant,
        lhs_limit,
        poly_a: Some(poly_a),
        poly_b: Some(poly_b),
        progress: false,
        ..SearchConfig::default()
    }
}
