// Usage: macrodex [--config FILE] [-M DIR]... [-e ENV] <determine|invoke|list|check-name> ...

fn main() {
    macrodex::cli::run();
}
