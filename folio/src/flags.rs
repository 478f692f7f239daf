use std::path::PathBuf;

xflags::xflags! {
    /// Builds a portfolio site: pages, skill pages and a static JSON API.
    cmd folio {
        /// The site root; defaults to the current directory.
        optional -r, --root root: PathBuf
        /// Log at debug level unless RUST_LOG says otherwise.
        optional -v, --verbose

        /// Cleans the output directories and builds the site.
        default cmd build {
            /// Only write the JSON API.
            optional --api-only
            /// Overrides the configured mode: job_hunting, project_promotion
            /// or self_promotion.
            optional --mode mode: String
            /// The href root of the API.
            optional --api-base base: String
        }

        /// Reports tags, skills and technologies that aren't linked.
        cmd audit {}

        /// Writes data/skills.new.toml: the declared skills plus inbox
        /// groups for uncovered technologies and languages.
        cmd skills {}
    }
}
