use crate::analysis::RoutineDataflow;
use crate::module::Module;
use std::fs;
use std::io;
use std::path::Path;

pub fn save_module(module: &Module, path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(module)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)?;
    Ok(())
}

pub fn load_module(path: impl AsRef<Path>) -> io::Result<Module> {
    let json = fs::read_to_string(path)?;
    module_from_json(&json)
}

/// Parses a module and rejects bodies with a block that has no terminator,
/// since those cannot be printed as textual IR.
pub fn module_from_json(json: &str) -> io::Result<Module> {
    let module: Module =
        serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    for routine in module.defined_routines() {
        if let Some(block) = routine.blocks().find(|b| !b.is_terminated()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("block {} of @{} has no terminator", block.name(), routine.name),
            ));
        }
    }
    Ok(module)
}

pub fn save_dataflow(dataflow: &RoutineDataflow, path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(dataflow)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)?;
    Ok(())
}

/// Loads a saved analysis and rebuilds its lookup indices.
pub fn load_dataflow(path: impl AsRef<Path>) -> io::Result<RoutineDataflow> {
    let json = fs::read_to_string(path)?;
    let mut dataflow: RoutineDataflow =
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    dataflow.variables.reindex();
    Ok(dataflow)
}
