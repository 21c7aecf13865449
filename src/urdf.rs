//! Extracts the kinematic chain from URDF (optional). The chain is walked
//! from the tip link towards the base, collecting movable joints, and then
//! reversed into base to tip order.

extern crate sxd_document;

use std::fs::read_to_string;
use std::path::Path;

use sxd_document::{QName, dom, parser};

use crate::chain::{ChainDescriptor, JointSpec};
use crate::chain_error::ChainError;

/// Reads the URDF (or expanded XACRO) file and extracts the chain between
/// the given base and tip links.
pub fn chain_from_urdf_file<P: AsRef<Path>>(
    path: P,
    base_link: &str,
    tip_link: &str,
) -> Result<ChainDescriptor, ChainError> {
    let xml_content = read_to_string(path)?;
    chain_from_urdf(&xml_content, base_link, tip_link)
}

/// One parsed `<joint>` element, keyed later by its child link.
#[derive(Debug)]
struct UrdfJoint {
    name: String,
    kind: String,
    parent_link: String,
    child_link: String,
    limits: Option<(f64, f64)>,
    soft_limits: Option<(f64, f64)>,
}

/// Extracts the chain between `base_link` and `tip_link` from URDF XML
/// content. Movable joints become [`JointSpec`] entries; continuous joints
/// get the +/- PI search bounds and no limit flag; where a safety controller
/// declares soft limits those are preferred over the hard ones.
pub fn chain_from_urdf(
    xml_content: &str,
    base_link: &str,
    tip_link: &str,
) -> Result<ChainDescriptor, ChainError> {
    let package = parser::parse(xml_content)
        .map_err(|e| ChainError::XmlProcessingError(format!("{}", e)))?;
    let document = package.as_document();

    let root_element = document
        .root()
        .children()
        .into_iter()
        .find_map(|e| e.element())
        .ok_or_else(|| ChainError::XmlProcessingError("No root element found".to_string()))?;

    let mut urdf_joints = Vec::new();
    collect_joints(root_element, &mut urdf_joints)?;

    // Walk from the tip towards the base
    let mut joints = Vec::new();
    let mut link_names = Vec::new();
    let mut current = tip_link.to_string();

    loop {
        log::debug!("Link {}", current);
        link_names.push(current.clone());
        if current == base_link {
            break;
        }
        if link_names.len() > urdf_joints.len() + 1 {
            return Err(ChainError::ParseError(format!(
                "The chain from {} never reaches {}",
                tip_link, base_link
            )));
        }

        let joint = urdf_joints
            .iter()
            .find(|j| j.child_link == current)
            .ok_or_else(|| ChainError::UnknownLink(current.clone()))?;

        match joint.kind.as_str() {
            "revolute" | "prismatic" => {
                let (lower, upper) = joint
                    .soft_limits
                    .or(joint.limits)
                    .ok_or_else(|| ChainError::MissingField(format!(
                        "limit element of joint {}", joint.name
                    )))?;
                log::debug!("Adding joint {}", joint.name);
                joints.push(JointSpec::limited(&joint.name, lower, upper));
            }
            "continuous" => {
                log::debug!("Adding continuous joint {}", joint.name);
                joints.push(JointSpec::continuous(&joint.name));
            }
            // Fixed and unknown joints contribute no degree of freedom
            _ => {}
        }
        current = joint.parent_link.clone();
    }

    joints.reverse();
    link_names.reverse();
    ChainDescriptor::new(joints, link_names)
}

// Recursive function to collect joint data
fn collect_joints(element: dom::Element, joints: &mut Vec<UrdfJoint>) -> Result<(), ChainError> {
    let joint_tag = QName::new("joint");
    let parent_tag = QName::new("parent");
    let child_tag = QName::new("child");
    let limit_tag = QName::new("limit");
    let safety_tag = QName::new("safety_controller");

    for child in element.children().into_iter().filter_map(|e| e.element()) {
        if child.name() == joint_tag {
            let name = attribute(child, "name").unwrap_or_else(|| "Unnamed".to_string());
            let kind = attribute(child, "type").unwrap_or_else(|| "unknown".to_string());

            let parent_element = find_child(child, parent_tag);
            let child_element = find_child(child, child_tag);
            let (Some(parent_element), Some(child_element)) = (parent_element, child_element)
            else {
                // A joint without parent or child cannot be part of any chain
                continue;
            };

            let parent_link = attribute(parent_element, "link")
                .ok_or_else(|| ChainError::MissingField(format!("parent link of {}", name)))?;
            let child_link = attribute(child_element, "link")
                .ok_or_else(|| ChainError::MissingField(format!("child link of {}", name)))?;

            let limits = find_child(child, limit_tag)
                .map(|el| get_limit_pair(el, "lower", "upper"))
                .transpose()?;
            let soft_limits = find_child(child, safety_tag)
                .map(|el| get_limit_pair(el, "soft_lower_limit", "soft_upper_limit"))
                .transpose()
                // Safety controller without soft limits is not an error
                .unwrap_or(None);

            joints.push(UrdfJoint {
                name,
                kind,
                parent_link,
                child_link,
                limits,
                soft_limits,
            });
        }

        collect_joints(child, joints)?;
    }

    Ok(())
}

fn attribute(element: dom::Element, name: &str) -> Option<String> {
    element.attribute(name).map(|attr| attr.value().to_string())
}

fn find_child<'d>(element: dom::Element<'d>, tag: QName) -> Option<dom::Element<'d>> {
    element
        .children()
        .into_iter()
        .find_map(|e| e.element().filter(|el| el.name() == tag))
}

fn get_limit_pair(
    element: dom::Element,
    lower_name: &str,
    upper_name: &str,
) -> Result<(f64, f64), ChainError> {
    let lower = parse_number(element, lower_name)?;
    let upper = parse_number(element, upper_name)?;
    Ok((lower, upper))
}

fn parse_number(element: dom::Element, name: &str) -> Result<f64, ChainError> {
    let attr = element
        .attribute(name)
        .ok_or_else(|| ChainError::MissingField(name.to_string()))?;
    attr.value()
        .parse()
        .map_err(|_| ChainError::ParseError(format!("{} = {}", name, attr.value())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const URDF: &str = r#"
        <robot name="planar4">
          <link name="base_link"/>
          <link name="link1"/>
          <link name="link2"/>
          <link name="link3"/>
          <link name="tool0"/>
          <joint name="joint1" type="continuous">
            <parent link="base_link"/>
            <child link="link1"/>
          </joint>
          <joint name="joint2" type="revolute">
            <parent link="link1"/>
            <child link="link2"/>
            <limit lower="-2.5" upper="2.5" effort="10" velocity="1"/>
          </joint>
          <joint name="joint3" type="revolute">
            <parent link="link2"/>
            <child link="link3"/>
            <limit lower="-3.0" upper="3.0" effort="10" velocity="1"/>
            <safety_controller soft_lower_limit="-2.8" soft_upper_limit="2.8"/>
          </joint>
          <joint name="joint4" type="revolute">
            <parent link="link3"/>
            <child link="tool0"/>
            <limit lower="-1.5" upper="1.5" effort="10" velocity="1"/>
          </joint>
        </robot>
    "#;

    #[test]
    fn test_chain_extraction() {
        let chain = chain_from_urdf(URDF, "base_link", "tool0").unwrap();
        assert_eq!(chain.dof(), 4);
        assert_eq!(chain.joint_names(), vec!["joint1", "joint2", "joint3", "joint4"]);
        assert_eq!(
            chain.link_names(),
            &["base_link", "link1", "link2", "link3", "tool0"]
        );
        assert_eq!(chain.tip_link(), "tool0");
    }

    #[test]
    fn test_continuous_joint_flags() {
        let chain = chain_from_urdf(URDF, "base_link", "tool0").unwrap();
        let j1 = chain.joint(0);
        assert!(!j1.has_limits);
        assert_eq!(j1.min, -PI);
        assert_eq!(j1.max, PI);
    }

    #[test]
    fn test_soft_limits_preferred() {
        let chain = chain_from_urdf(URDF, "base_link", "tool0").unwrap();
        let j3 = chain.joint(2);
        assert!(j3.has_limits);
        assert_eq!(j3.min, -2.8);
        assert_eq!(j3.max, 2.8);
    }

    #[test]
    fn test_hard_limits_without_safety() {
        let chain = chain_from_urdf(URDF, "base_link", "tool0").unwrap();
        let j2 = chain.joint(1);
        assert_eq!(j2.min, -2.5);
        assert_eq!(j2.max, 2.5);
    }

    #[test]
    fn test_partial_chain() {
        let chain = chain_from_urdf(URDF, "link1", "tool0").unwrap();
        assert_eq!(chain.dof(), 3);
        assert_eq!(chain.joint_names(), vec!["joint2", "joint3", "joint4"]);
    }

    #[test]
    fn test_unknown_tip_link() {
        let result = chain_from_urdf(URDF, "base_link", "no_such_link");
        assert!(matches!(result, Err(ChainError::UnknownLink(_))));
    }

    #[test]
    fn test_unreachable_base() {
        let result = chain_from_urdf(URDF, "not_in_chain", "tool0");
        assert!(result.is_err());
    }

    #[test]
    fn test_unreadable_model() {
        let result = chain_from_urdf("<robot><joint></robot>", "base", "tip");
        assert!(matches!(result, Err(ChainError::XmlProcessingError(_))));
    }
}
