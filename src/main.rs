use std::collections::BTreeMap;
use std::time::Duration;

use rs_ikfast_kinematics::chain::{ChainDescriptor, JointSpec};
use rs_ikfast_kinematics::kinematic_traits::{DiscretizationMethod, Kinematics};
use rs_ikfast_kinematics::kinematics_impl::{DEFAULT_SEARCH_DISCRETIZATION, IkFastKinematics};
use rs_ikfast_kinematics::planar::PlanarArm4;
use rs_ikfast_kinematics::utils::{dump_joints, dump_solutions};

/// Usage example.
fn main() -> anyhow::Result<()> {
    // A planar 4R arm plays the role of the generated solver: joint 0 is
    // redundant, the remaining three joints are solved in closed form.
    let chain = ChainDescriptor::new(
        vec![
            JointSpec::limited("joint1", -3.0, 3.0),
            JointSpec::limited("joint2", -3.0, 3.0),
            JointSpec::limited("joint3", -3.0, 3.0),
            JointSpec::limited("joint4", -3.0, 3.0),
        ],
        vec![
            "base_link".to_string(),
            "link1".to_string(),
            "link2".to_string(),
            "link3".to_string(),
            "tool0".to_string(),
        ],
    )?;
    let robot = IkFastKinematics::initialized(
        PlanarArm4::new(0.4, 0.4, 0.3, 0.15),
        chain,
        DEFAULT_SEARCH_DISCRETIZATION,
    )?;

    let joints = vec![0.3, 0.5, -0.9, 0.4];
    println!("Initial joints:");
    dump_joints(&joints);

    let pose = robot
        .position_fk(&["tool0".to_string()], &joints)?
        .remove(0);
    println!("Tip pose: translation {:?}", pose.translation.vector.as_slice());

    println!("Closest solution from a seed near the initial joints:");
    let seed = vec![0.3, 0.45, -0.8, 0.35];
    let solution = robot.position_ik(&pose, &seed)?;
    dump_joints(&solution);

    println!("Search from a seed whose free joint is off, one second budget:");
    let far_seed = vec![0.8, 0.0, 0.0, 0.0];
    let found = robot.search_ik(&pose, &far_seed, Duration::from_secs(1))?;
    dump_joints(&found);

    println!("All solutions with the free joint uniformly discretized:");
    let mut discretization = BTreeMap::new();
    discretization.insert(0usize, 0.5);
    robot.set_search_discretization(&discretization)?;
    let solutions = robot.position_ik_multi(
        &[pose],
        &joints,
        DiscretizationMethod::AllDiscretized,
    )?;
    dump_solutions(&solutions);

    #[cfg(feature = "allow_filesystem")]
    {
        // The chain itself would normally come from the robot model
        let urdf = r#"
            <robot name="one">
              <joint name="joint1" type="revolute">
                <parent link="base_link"/>
                <child link="tool0"/>
                <limit lower="-1.0" upper="1.0" effort="1" velocity="1"/>
              </joint>
            </robot>
        "#;
        let chain = rs_ikfast_kinematics::urdf::chain_from_urdf(urdf, "base_link", "tool0")?;
        println!("Chain from URDF: {:?} joints", chain.dof());
    }

    Ok(())
}
