// Unit tests for the viewer command and bootstraps

use crate::error::launch::LaunchError;
use crate::launcher::{
    Bootstrap, NoBootstrap, ViewerBootstrap, split_arguments, viewer_command, viewer_dir_from,
};
use crate::{VIEWER_PATH_ENV, VIEWER_SHELL};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn given_viewer_dir_when_building_command_then_shell_script_runs_jar() {
    // GIVEN / WHEN: A command for a known directory
    let command = viewer_command(Path::new("/opt/viewer"));

    // THEN: sh runs the trap wrapper around the jar
    assert_eq!(command.program, VIEWER_SHELL);
    assert_eq!(
        command.arguments,
        "-c \"trap 'kill %1' 0 1 2 ; java -Xms1024m -Xmx2048m -jar /opt/viewer/ScrollView.jar & wait\""
    );
}

#[test]
fn given_viewer_command_when_split_then_script_is_single_argument() {
    let command = viewer_command(Path::new("."));

    let arguments = split_arguments(&command.arguments);

    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[0], "-c");
    assert!(arguments[1].starts_with("trap 'kill %1' 0 1 2 ; java"));
    assert!(arguments[1].ends_with("ScrollView.jar & wait"));
}

#[test]
fn given_variable_set_when_reading_viewer_dir_then_value_used() {
    let dir = viewer_dir_from(|key| (key == VIEWER_PATH_ENV).then(|| String::from("/srv/sv")));
    assert_eq!(dir, PathBuf::from("/srv/sv"));
}

#[test]
fn given_variable_unset_when_reading_viewer_dir_then_current_dir() {
    let dir = viewer_dir_from(|_| None);
    assert_eq!(dir, PathBuf::from("."));
}

#[test]
fn given_variable_empty_when_reading_viewer_dir_then_current_dir() {
    let dir = viewer_dir_from(|_| Some(String::new()));
    assert_eq!(dir, PathBuf::from("."));
}

#[test]
fn given_bootstrap_dir_when_building_command_then_dir_flows_into_command() {
    let bootstrap = ViewerBootstrap::new("/tmp/sv");

    assert_eq!(bootstrap.viewer_dir(), Path::new("/tmp/sv"));
    assert!(bootstrap.command().arguments.contains("/tmp/sv/ScrollView.jar"));
}

#[test]
fn given_no_bootstrap_when_launched_then_nothing_happens() {
    assert!(NoBootstrap.launch().is_ok());
}

#[test]
fn given_closure_when_used_as_bootstrap_then_closure_runs() {
    // GIVEN: A closure counting launches
    let launches = AtomicUsize::new(0);
    let bootstrap = || -> Result<(), LaunchError> {
        launches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    };

    // WHEN: Launching through the trait
    fn launch_twice(bootstrap: &dyn Bootstrap) {
        bootstrap.launch().unwrap();
        bootstrap.launch().unwrap();
    }
    launch_twice(&bootstrap);

    // THEN: Each launch reached the closure
    assert_eq!(launches.load(Ordering::SeqCst), 2);
}
