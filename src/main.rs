use glam::{Quat, Vec3};
use humanoid_ik::dynamics::{SpringPreset, TargetSmoother};
use humanoid_ik::ik::{BodyChain, ChainId, IkManager};
use humanoid_ik::math::Transform;
use humanoid_ik::pose::PoseBuffer;
use humanoid_ik::skeleton::{humanoid_t_pose, Side, Skeleton, SkeletonProvider};
use std::f32::consts::TAU;

const FRAME_DT: f32 = 1.0 / 90.0;
const FRAMES: usize = 360;

/// Fake tracker: the right hand circles in front of the chest, the left foot
/// lifts and drops.
fn tracker_pose(chain: BodyChain, time: f32) -> Option<Transform> {
    let phase = time * TAU * 0.5;
    match chain {
        BodyChain::RightHand => Some(Transform::new(
            Vec3::new(0.3 + 0.1 * phase.cos(), 1.3 + 0.1 * phase.sin(), -0.3),
            Quat::from_rotation_z(-0.3),
        )),
        BodyChain::LeftFoot => Some(Transform::from_position(Vec3::new(
            -0.1,
            0.15 + 0.1 * phase.sin().max(0.0),
            -0.1,
        ))),
        _ => None,
    }
}

fn reach_error(manager: &IkManager, skeleton: &Skeleton, id: ChainId) -> Option<f32> {
    let root = skeleton.root();
    let target = manager.target(id)?.world_pose(&root);
    let limb = skeleton.position(manager.chain(id)?.limb)?;
    Some(limb.distance(target.position))
}

fn main() {
    env_logger::init();

    let mut skeleton = match humanoid_t_pose(Transform::IDENTITY) {
        Ok(skeleton) => skeleton,
        Err(err) => {
            log::error!("failed to build rig: {err}");
            return;
        }
    };

    let mut manager = IkManager::default();
    let bound = manager.bind(&skeleton);
    log::info!("bound {bound} chains on {} joints", skeleton.joint_count());

    let tracked = [BodyChain::RightHand, BodyChain::LeftFoot];
    let mut smoothers: Vec<(BodyChain, TargetSmoother)> = tracked
        .iter()
        .filter_map(|&chain| {
            let start = tracker_pose(chain, 0.0)?;
            Some((chain, TargetSmoother::new(SpringPreset::Snappy, start)))
        })
        .collect();

    let mut buffer = PoseBuffer::from_skeleton(&skeleton);

    for frame in 0..FRAMES {
        let time = frame as f32 * FRAME_DT;
        let root = skeleton.root();

        for (chain, smoother) in smoothers.iter_mut() {
            let Some(raw) = tracker_pose(*chain, time) else {
                continue;
            };
            let pose = smoother.update(raw, FRAME_DT);
            if let Some(target) = manager.target_mut(ChainId::Body(*chain)) {
                target.set_world_pose(&root, pose.position, pose.rotation);
            }
        }

        // Left hand copies the right one.
        manager.mirror_pose(Side::Right, Side::Left);

        manager.reset_pose(&mut skeleton);
        manager.update_tracking(&mut skeleton);
        buffer.refresh(&skeleton);

        if frame % 90 == 0 {
            for chain in [BodyChain::RightHand, BodyChain::LeftHand, BodyChain::LeftFoot] {
                let id = ChainId::Body(chain);
                if let Some(error) = reach_error(&manager, &skeleton, id) {
                    log::info!("frame {frame:>3} {id}: reach error {error:.4} m");
                }
            }
        }
    }

    manager.calibrate(&skeleton);
    manager.reset_pose(&mut skeleton);
    buffer.refresh(&skeleton);
    log::info!(
        "calibrated; exported {} joint matrices ({} bytes)",
        buffer.len(),
        buffer.as_bytes().len()
    );
}
