//! C source generation for the self-extracting runtime
//!
//! Two translation units make up a packaged binary: the runtime stub, which
//! unpacks the payload and replays the `main` block, and the data unit,
//! which holds the payload bytes.

use crate::ast::FunctionBlock;
use crate::types::{DATA_LEN_SYMBOL, DATA_SYMBOL};
use regex::Regex;

/// Hex entries per line in hand-emitted data units.
pub const BYTES_PER_LINE: usize = 12;

const RUNTIME_PRELUDE: &str = r#"/*
 * LightPath runtime - generated automatically, do not edit
 */

#define _XOPEN_SOURCE 700

#include <stdio.h>
#include <stdlib.h>
#include <string.h>
#include <unistd.h>

#define LP_PATH_MAX 4096

"#;

const RUNTIME_HELPERS: &str = r#"
static void remove_dir(const char *dir) {
    char cmd[LP_PATH_MAX + 32];
    snprintf(cmd, sizeof(cmd), "rm -rf '%s'", dir);
    if (system(cmd) != 0) {
        fprintf(stderr, "lightpath: could not remove %s\n", dir);
    }
}

static int extract_payload(const char *dir) {
    char zip_path[LP_PATH_MAX];
    snprintf(zip_path, sizeof(zip_path), "%s/app.zip", dir);

    FILE *zip_file = fopen(zip_path, "wb");
    if (!zip_file) {
        return 1;
    }
    size_t written = fwrite(SOURCE_DATA, 1, SOURCE_DATA_LEN, zip_file);
    if (fclose(zip_file) != 0 || written != SOURCE_DATA_LEN) {
        return 1;
    }

    char unzip_cmd[LP_PATH_MAX + 64];
    snprintf(unzip_cmd, sizeof(unzip_cmd), "cd '%s' && unzip -q app.zip >/dev/null 2>&1", dir);
    return system(unzip_cmd) != 0;
}

static void run_in(const char *dir, const char *command) {
    if (chdir(dir) != 0) {
        fprintf(stderr, "lightpath: cannot enter %s\n", dir);
    }
    int status = system(command);
    if (status != 0) {
        fprintf(stderr, "lightpath: `%s` failed with status %d\n", command, status);
    }
}

"#;

/// Emits the runtime stub for a `main` block.
pub struct RuntimeGenerator<'a> {
    main: &'a FunctionBlock,
}

impl<'a> RuntimeGenerator<'a> {
    pub fn new(main: &'a FunctionBlock) -> Self {
        Self { main }
    }

    pub fn generate(&self) -> String {
        let mut out = String::from(RUNTIME_PRELUDE);

        out.push_str(&format!("extern unsigned char {}[];\n", DATA_SYMBOL));
        out.push_str(&format!("extern unsigned int {};\n", DATA_LEN_SYMBOL));
        out.push_str(
            &RUNTIME_HELPERS
                .replace("SOURCE_DATA_LEN", DATA_LEN_SYMBOL)
                .replace("SOURCE_DATA", DATA_SYMBOL),
        );

        out.push_str("int main(void) {\n");
        out.push_str("    char temp_dir[] = \"/tmp/lightpath_XXXXXX\";\n");
        out.push_str("    char old_cwd[LP_PATH_MAX];\n\n");
        out.push_str("    if (!getcwd(old_cwd, sizeof(old_cwd))) {\n");
        out.push_str("        return 1;\n");
        out.push_str("    }\n");
        out.push_str("    if (!mkdtemp(temp_dir)) {\n");
        out.push_str("        return 1;\n");
        out.push_str("    }\n");
        out.push_str("    if (extract_payload(temp_dir) != 0) {\n");
        out.push_str("        fprintf(stderr, \"lightpath: could not unpack the application\\n\");\n");
        out.push_str("        remove_dir(temp_dir);\n");
        out.push_str("        return 1;\n");
        out.push_str("    }\n\n");

        for command in self.main.commands() {
            let dir = if command.path_mode().is_application() {
                "temp_dir"
            } else {
                "old_cwd"
            };
            out.push_str(&format!(
                "    run_in({}, {});\n",
                dir,
                c_string_literal(command.text())
            ));
        }

        out.push_str("\n    if (chdir(old_cwd) != 0) {\n");
        out.push_str("        fprintf(stderr, \"lightpath: cannot return to %s\\n\", old_cwd);\n");
        out.push_str("    }\n");
        out.push_str("    remove_dir(temp_dir);\n");
        out.push_str("    return 0;\n");
        out.push_str("}\n");

        out
    }
}

/// Quote `text` as a C string literal. Non-printable and non-ASCII bytes
/// become three-digit octal escapes.
pub fn c_string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');

    for byte in text.bytes() {
        match byte {
            b'\\' => literal.push_str("\\\\"),
            b'"' => literal.push_str("\\\""),
            b'?' => literal.push_str("\\?"),
            b'\n' => literal.push_str("\\n"),
            b'\r' => literal.push_str("\\r"),
            b'\t' => literal.push_str("\\t"),
            0x20..=0x7e => literal.push(byte as char),
            _ => literal.push_str(&format!("\\{:03o}", byte)),
        }
    }

    literal.push('"');
    literal
}

/// Render payload bytes as the data unit the runtime links against.
pub fn render_embedded_data(bytes: &[u8]) -> String {
    let mut out = format!("unsigned char {}[] = {{\n", DATA_SYMBOL);

    if bytes.is_empty() {
        // C forbids empty initializers; the length still says zero
        out.push_str("  0x00\n");
    }

    let line_count = bytes.chunks(BYTES_PER_LINE).len();
    for (index, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        let entries: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
        out.push_str("  ");
        out.push_str(&entries.join(", "));
        if index + 1 < line_count {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("};\n");
    out.push_str(&format!("unsigned int {} = {};\n", DATA_LEN_SYMBOL, bytes.len()));
    out
}

/// Identifier `xxd -i` derives from a file name.
pub fn xxd_symbol(file_name: &str) -> String {
    let mut symbol: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if symbol.starts_with(|c: char| c.is_ascii_digit()) {
        symbol.insert_str(0, "__");
    }
    symbol
}

/// Rename the symbols in `xxd -i` output to the ones the runtime expects.
pub fn rename_xxd_symbols(xxd_output: &str, file_name: &str) -> String {
    let pattern = format!(r"\b{}(_len)?\b", regex::escape(&xxd_symbol(file_name)));
    match Regex::new(&pattern) {
        Ok(regex) => regex
            .replace_all(xxd_output, format!("{}${{1}}", DATA_SYMBOL).as_str())
            .into_owned(),
        Err(e) => {
            log::warn!("Could not build symbol pattern for {}: {}", file_name, e);
            xxd_output.to_string()
        }
    }
}
