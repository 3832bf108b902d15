// multipart/form-data encoding.
//
// A pure function from `(fields, file)` to `(body, content type)` so the wire
// format can be checked without a network. The layout is the one browsers
// produce: one part per scalar field, then the file part, then the closing
// boundary.

/// Prefix of every generated boundary token.
pub const BOUNDARY_PREFIX: &str = "----WebKitFormBoundary";

/// The single file carried by a form.
#[derive(Debug, Clone, Copy)]
pub struct FilePart<'a> {
    /// Form field name, `file` for the upload endpoint.
    pub name: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

/// Build a fresh boundary: the fixed prefix followed by 16 random bytes in hex.
pub fn generate_boundary() -> String {
    let bytes: [u8; 16] = rand::random();
    let mut boundary = String::with_capacity(BOUNDARY_PREFIX.len() + 32);
    boundary.push_str(BOUNDARY_PREFIX);
    for b in bytes {
        boundary.push_str(&format!("{b:02x}"));
    }
    boundary
}

/// Encode with a freshly generated boundary.
pub fn encode(fields: &[(&str, &str)], file: &FilePart<'_>) -> (Vec<u8>, String) {
    encode_with_boundary(fields, file, &generate_boundary())
}

/// Encode with a caller-chosen boundary. The boundary must not occur in any
/// value or in the file data.
pub fn encode_with_boundary(
    fields: &[(&str, &str)],
    file: &FilePart<'_>,
    boundary: &str,
) -> (Vec<u8>, String) {
    let mut body = Vec::with_capacity(file.data.len() + 256 * (fields.len() + 1));

    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_header_value(name)
            )
            .as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            escape_header_value(file.name),
            escape_header_value(file.file_name)
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
    body.extend_from_slice(file.data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (body, format!("multipart/form-data; boundary={boundary}"))
}

// Names sit inside a quoted header parameter; quote and line breaks would end it.
fn escape_header_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("%22"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            c => out.push(c),
        }
    }
    out
}
