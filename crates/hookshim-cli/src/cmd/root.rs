use crate::output::print_json;
use hookshim_core::root::Resolution;

pub fn run(resolution: &Resolution, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(resolution)?;
    } else {
        println!("{}", resolution.root.display());
    }
    Ok(())
}
