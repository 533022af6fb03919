use alloy::sol;

use crate::types::jobs::payload;

// Structs are shared by the miner and the v2 pool interfaces.
sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct AccountUpdate {
        bytes32 inputRoot;
        bytes32 inputNullifierHash;
        bytes32 outputRoot;
        uint256 outputPathIndices;
        bytes32 outputCommitment;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct RewardExtData {
        address relayer;
        bytes encryptedAccount;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct RewardArgs {
        uint256 rate;
        uint256 fee;
        address instance;
        bytes32 rewardNullifier;
        bytes32 extDataHash;
        bytes32 depositRoot;
        bytes32 withdrawalRoot;
        RewardExtData extData;
        AccountUpdate account;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct WithdrawExtData {
        uint256 fee;
        address recipient;
        address relayer;
        bytes encryptedAccount;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct WithdrawArgs {
        uint256 amount;
        bytes32 extDataHash;
        WithdrawExtData extData;
        AccountUpdate account;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct TreeUpdateArgs {
        bytes32 oldRoot;
        bytes32 newRoot;
        bytes32 leaf;
        uint256 pathIndices;
    }

    interface Miner {
        function reward(bytes proof, RewardArgs args) external;
        function reward(bytes proof, RewardArgs args, bytes treeUpdateProof, TreeUpdateArgs treeUpdateArgs) external;
        function withdraw(bytes proof, WithdrawArgs args) external;
        function withdraw(bytes proof, WithdrawArgs args, bytes treeUpdateProof, TreeUpdateArgs treeUpdateArgs) external;
        function batchReward(bytes[] rewardArgs) external;
    }

    interface Instance {
        function withdraw(bytes proof, bytes32 root, bytes32 nullifierHash, address recipient, address relayer, uint256 fee, uint256 refund) external payable;
    }

    interface Proxy {
        function withdraw(address instance, bytes proof, bytes32 root, bytes32 nullifierHash, address recipient, address relayer, uint256 fee, uint256 refund) external payable;
    }

    interface ShieldedPool {
        function withdraw(bytes proof, WithdrawArgs args) external;
    }

    #[sol(rpc)]
    interface RewardSwap {
        function poofVirtualBalance() external view returns (uint256);
        function poolWeight() external view returns (uint256);
    }
}

impl From<&payload::AccountUpdate> for AccountUpdate {
    fn from(account: &payload::AccountUpdate) -> Self {
        Self {
            inputRoot: account.input_root,
            inputNullifierHash: account.input_nullifier_hash,
            outputRoot: account.output_root,
            outputPathIndices: account.output_path_indices,
            outputCommitment: account.output_commitment,
        }
    }
}

impl From<&payload::RewardArgs> for RewardArgs {
    fn from(args: &payload::RewardArgs) -> Self {
        Self {
            rate: args.rate,
            fee: args.fee,
            instance: args.instance,
            rewardNullifier: args.reward_nullifier,
            extDataHash: args.ext_data_hash,
            depositRoot: args.deposit_root,
            withdrawalRoot: args.withdrawal_root,
            extData: RewardExtData {
                relayer: args.ext_data.relayer,
                encryptedAccount: args.ext_data.encrypted_account.clone(),
            },
            account: (&args.account).into(),
        }
    }
}

impl From<&payload::WithdrawArgs> for WithdrawArgs {
    fn from(args: &payload::WithdrawArgs) -> Self {
        Self {
            amount: args.amount,
            extDataHash: args.ext_data_hash,
            extData: WithdrawExtData {
                fee: args.ext_data.fee,
                recipient: args.ext_data.recipient,
                relayer: args.ext_data.relayer,
                encryptedAccount: args.ext_data.encrypted_account.clone(),
            },
            account: (&args.account).into(),
        }
    }
}
