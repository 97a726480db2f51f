use std::io;

fn main() -> io::Result<()> {
    nacre::repl::run()
}
