//! Build script - embeds the git commit hash for dev builds.
//!
//! Without the `release` feature (default dev builds) the script emits
//! `VERGEN_GIT_SHA` so `--version` can show which commit a binary came from.
//! With the `release` feature (CI/official builds) nothing is emitted and the
//! version string stays clean.

fn main() {
    #[cfg(not(feature = "release"))]
    {
        use vergen_gitcl::{Emitter, GitclBuilder};

        let git = GitclBuilder::default()
            .sha(true)
            .build()
            .expect("Failed to configure git info");

        if let Err(e) = Emitter::default()
            .add_instructions(&git)
            .expect("Failed to add git instructions")
            .emit()
        {
            // Not fatal - building from a tarball has no git metadata
            eprintln!("cargo:warning=Failed to get git info: {}", e);
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
        }
    }

    #[cfg(feature = "release")]
    {
        // Official builds carry no git info
    }
}
