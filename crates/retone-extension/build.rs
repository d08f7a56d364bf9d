//! Embed the Gemini API key from `.env` at build time.
//!
//! Looks for `GEMINI_API_KEY` in the process environment or the nearest
//! `.env` file. A missing key is not an error: the extension builds and
//! reports the missing key when a rewrite is attempted.

fn main() {
    println!("cargo:rerun-if-env-changed=GEMINI_API_KEY");

    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            println!("cargo:rustc-env=RETONE_GEMINI_API_KEY={}", key.trim());
        }
        _ => println!("cargo:warning=GEMINI_API_KEY not set; rewrites will fail until a key is stored"),
    }
}
