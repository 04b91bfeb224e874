use std::{
  env,
  error::Error,
  fs,
  io::{self, BufWriter, Read, Write},
};

use firstfit::{FirstFitHeap, HeapConfig, Script, Session};

/// Reads the script from the path given as the first argument, or from
/// stdin when there is none.
fn read_script() -> io::Result<String> {
  match env::args().nth(1) {
    Some(path) => fs::read_to_string(path),
    None => {
      let mut input = String::new();
      io::stdin().read_to_string(&mut input)?;
      Ok(input)
    }
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  env_logger::init();

  let script: Script = read_script()?.parse()?;

  let config = HeapConfig::from_env();
  log::info!(
    "heap of {} bytes, {} byte headers, {} operations",
    config.heap_size,
    config.header_size,
    script.operations.len()
  );

  let heap = FirstFitHeap::map(&config)?;
  let mut session = Session::new(heap);

  let stdout = io::stdout();
  let mut out = BufWriter::new(stdout.lock());
  session.run(&script, &mut out)?;
  out.flush()?;

  Ok(())
}
